//! Named signals produced by the clock tree.
//!
//! A signal is produced exactly once and referenced by [`SignalId`]
//! everywhere else. Several names may resolve to one id; the memory read
//! strobe is an alias of the write strobe, not a second signal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a signal in its [`SignalTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignalId(pub u32);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig{}", self.0)
    }
}

/// A produced signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Canonical name.
    pub name: String,
    /// Component that drives it (e.g., "pll", "dcm", "board").
    pub producer: String,
}

/// Produced-once signal registry with name aliasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTable {
    signals: Vec<Signal>,
    names: BTreeMap<String, SignalId>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new signal. Re-producing an existing name returns its id.
    pub fn produce(&mut self, name: &str, producer: &str) -> SignalId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(Signal {
            name: name.into(),
            producer: producer.into(),
        });
        self.names.insert(name.into(), id);
        id
    }

    /// Make `name` resolve to an already produced signal.
    pub fn alias(&mut self, name: &str, target: SignalId) {
        self.names.insert(name.into(), target);
    }

    /// Resolve a name to its signal.
    pub fn lookup(&self, name: &str) -> Option<SignalId> {
        self.names.get(name).copied()
    }

    /// Get a signal by id.
    pub fn get(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id.0 as usize)
    }

    /// Canonical name of a signal.
    pub fn name(&self, id: SignalId) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("<unknown>")
    }

    /// Number of distinct signals (aliases excluded).
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// All resolvable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = (&str, SignalId)> {
        self.names.iter().map(|(n, &id)| (n.as_str(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_to_same_id() {
        let mut t = SignalTable::new();
        let wr = t.produce("write_strobe", "pll");
        t.alias("read_strobe", wr);
        assert_eq!(t.lookup("read_strobe"), Some(wr));
        assert_eq!(t.len(), 1);
        assert_eq!(t.name(wr), "write_strobe");
        assert_eq!(t.names().count(), 2);
    }

    #[test]
    fn produce_is_idempotent() {
        let mut t = SignalTable::new();
        let a = t.produce("pll_locked", "pll");
        let b = t.produce("pll_locked", "pll");
        assert_eq!(a, b);
        assert_eq!(t.len(), 1);
        assert!(t.lookup("missing").is_none());
    }
}
