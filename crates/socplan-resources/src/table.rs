//! Layered resource tables.
//!
//! A [`ResourceTable`] is the result of applying ordered [`ResourceLayer`]s
//! on top of a base table. Within one kind, a layer entry whose name already
//! exists replaces the old value; a new name must not reuse a value held by a
//! different name. A final pass checks every kind is injective, since a
//! replaced value can land on an entry no layer touched.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::kind::{ResourceEntry, ResourceKind, ResourceLimits};

/// A value in the table and the layer that last set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub value: u64,
    pub origin: String,
}

/// One overlay: the resource requests of a SoC variant or subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLayer {
    /// Who contributed the layer (variant or subsystem name).
    pub origin: String,
    pub entries: Vec<ResourceEntry>,
}

impl ResourceLayer {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, entry: ResourceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn csr(self, name: &str, index: u64) -> Self {
        self.with(ResourceEntry::csr(name, index))
    }

    pub fn mem(self, name: &str, base: u64) -> Self {
        self.with(ResourceEntry::mem(name, base))
    }

    pub fn irq(self, name: &str, line: u64) -> Self {
        self.with(ResourceEntry::irq(name, line))
    }

    pub fn push(&mut self, entry: ResourceEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merged, per-kind resource assignments in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceTable {
    register_banks: IndexMap<String, Assignment>,
    memory_bases: IndexMap<String, Assignment>,
    interrupts: IndexMap<String, Assignment>,
    layers: Vec<String>,
}

impl ResourceTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a base table from a single layer.
    pub fn from_layer(layer: &ResourceLayer) -> Result<Self> {
        merge(&Self::new(), std::slice::from_ref(layer))
    }

    fn map(&self, kind: ResourceKind) -> &IndexMap<String, Assignment> {
        match kind {
            ResourceKind::RegisterBank => &self.register_banks,
            ResourceKind::MemoryBase => &self.memory_bases,
            ResourceKind::Interrupt => &self.interrupts,
        }
    }

    fn map_mut(&mut self, kind: ResourceKind) -> &mut IndexMap<String, Assignment> {
        match kind {
            ResourceKind::RegisterBank => &mut self.register_banks,
            ResourceKind::MemoryBase => &mut self.memory_bases,
            ResourceKind::Interrupt => &mut self.interrupts,
        }
    }

    /// Value assigned to `(kind, name)`.
    pub fn lookup(&self, kind: ResourceKind, name: &str) -> Option<u64> {
        self.map(kind).get(name).map(|a| a.value)
    }

    /// Layer that last assigned `(kind, name)`.
    pub fn origin(&self, kind: ResourceKind, name: &str) -> Option<&str> {
        self.map(kind).get(name).map(|a| a.origin.as_str())
    }

    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.map(kind).contains_key(name)
    }

    /// Entries of one kind in insertion order.
    pub fn entries(&self, kind: ResourceKind) -> impl Iterator<Item = (&str, u64)> {
        self.map(kind).iter().map(|(n, a)| (n.as_str(), a.value))
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|&k| self.map(k).is_empty())
    }

    /// Origins of the applied layers, in application order.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Flatten into entries, kind by kind.
    pub fn to_entries(&self) -> Vec<ResourceEntry> {
        ResourceKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.entries(kind)
                    .map(move |(name, value)| ResourceEntry::new(kind, name, value))
            })
            .collect()
    }

    fn apply(&mut self, layer: &ResourceLayer) -> Result<()> {
        for entry in &layer.entries {
            let map = self.map_mut(entry.kind);
            if let Some(slot) = map.get_mut(&entry.name) {
                if slot.value != entry.value {
                    log::debug!(
                        "{} '{}': {} overrides {:#x} from {} with {:#x}",
                        entry.kind,
                        entry.name,
                        layer.origin,
                        slot.value,
                        slot.origin,
                        entry.value
                    );
                }
                slot.value = entry.value;
                slot.origin = layer.origin.clone();
                continue;
            }
            if let Some((holder, _)) = map.iter().find(|(_, a)| a.value == entry.value) {
                return Err(ResourceError::Collision {
                    kind: entry.kind,
                    existing: holder.clone(),
                    incoming: entry.name.clone(),
                    value: entry.value,
                });
            }
            map.insert(
                entry.name.clone(),
                Assignment {
                    value: entry.value,
                    origin: layer.origin.clone(),
                },
            );
        }
        self.layers.push(layer.origin.clone());
        Ok(())
    }

    fn validate(&self, limits: &ResourceLimits) -> Result<()> {
        for kind in ResourceKind::ALL {
            let mut seen: HashMap<u64, &str> = HashMap::new();
            for (name, assignment) in self.map(kind) {
                if let Some(limit) = limits.limit(kind) {
                    if assignment.value >= limit {
                        return Err(ResourceError::OutOfRange {
                            kind,
                            name: name.clone(),
                            value: assignment.value,
                            limit,
                        });
                    }
                }
                if let Some(holder) = seen.insert(assignment.value, name) {
                    return Err(ResourceError::Collision {
                        kind,
                        existing: holder.to_string(),
                        incoming: name.clone(),
                        value: assignment.value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Apply `overlays` in order on top of `base` with the default limits.
pub fn merge(base: &ResourceTable, overlays: &[ResourceLayer]) -> Result<ResourceTable> {
    merge_with_limits(base, overlays, &ResourceLimits::default())
}

/// Apply `overlays` in order on top of `base` and validate the result.
pub fn merge_with_limits(
    base: &ResourceTable,
    overlays: &[ResourceLayer],
    limits: &ResourceLimits,
) -> Result<ResourceTable> {
    let mut table = base.clone();
    for layer in overlays {
        table.apply(layer)?;
    }
    table.validate(limits)?;
    log::debug!(
        "merged {} layers: {} csr, {} mem, {} irq",
        overlays.len(),
        table.len(ResourceKind::RegisterBank),
        table.len(ResourceKind::MemoryBase),
        table.len(ResourceKind::Interrupt)
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soc() -> ResourceTable {
        ResourceTable::from_layer(
            &ResourceLayer::new("soc")
                .csr("crg", 0)
                .csr("uart", 2)
                .irq("uart", 0)
                .irq("timer0", 1)
                .mem("rom", 0x0000_0000)
                .mem("sram", 0x1000_0000),
        )
        .unwrap()
    }

    #[test]
    fn later_layer_wins_on_same_name() {
        let overlay = ResourceLayer::new("board").csr("uart", 5);
        let t = merge(&soc(), &[overlay]).unwrap();
        assert_eq!(t.lookup(ResourceKind::RegisterBank, "uart"), Some(5));
        assert_eq!(t.origin(ResourceKind::RegisterBank, "uart"), Some("board"));
        assert_eq!(t.origin(ResourceKind::RegisterBank, "crg"), Some("soc"));
    }

    #[test]
    fn new_name_on_taken_value_collides() {
        let overlay = ResourceLayer::new("mini").irq("ethmac", 1);
        let err = merge(&soc(), &[overlay]).unwrap_err();
        match err {
            ResourceError::Collision {
                kind,
                existing,
                incoming,
                value,
            } => {
                assert_eq!(kind, ResourceKind::Interrupt);
                assert_eq!(existing, "timer0");
                assert_eq!(incoming, "ethmac");
                assert_eq!(value, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn kinds_are_independent_namespaces() {
        // irq 2 and csr 2 do not conflict
        let overlay = ResourceLayer::new("mini").irq("ethmac", 2);
        assert!(merge(&soc(), &[overlay]).is_ok());
    }

    #[test]
    fn final_pass_catches_replaced_value() {
        // "uart" moves onto the value held by "crg"; no new name is involved.
        let overlay = ResourceLayer::new("board").csr("uart", 0);
        let err = merge(&soc(), &[overlay]).unwrap_err();
        assert!(matches!(err, ResourceError::Collision { value: 0, .. }));
    }

    #[test]
    fn temporary_conflict_resolved_by_later_layer() {
        let a = ResourceLayer::new("a").csr("uart", 0);
        let b = ResourceLayer::new("b").csr("crg", 7);
        let t = merge(&soc(), &[a, b]).unwrap();
        assert_eq!(t.lookup(ResourceKind::RegisterBank, "uart"), Some(0));
        assert_eq!(t.lookup(ResourceKind::RegisterBank, "crg"), Some(7));
    }

    #[test]
    fn merge_is_associative_in_order() {
        let a = ResourceLayer::new("a").csr("ddrphy", 16);
        let b = ResourceLayer::new("b").mem("firmware_ram", 0x2000_0000);
        let c = ResourceLayer::new("c").csr("ethmac", 18).irq("ethmac", 2);

        let first = merge(&soc(), &[a.clone(), b.clone()]).unwrap();
        let stepwise = merge(&first, &[c.clone()]).unwrap();
        let direct = merge(&soc(), &[a, b, c]).unwrap();
        assert_eq!(stepwise.to_entries(), direct.to_entries());
        assert_eq!(stepwise.layers(), direct.layers());
    }

    #[test]
    fn reapplying_a_layer_is_idempotent() {
        let layer = ResourceLayer::new("mini")
            .csr("ethphy", 17)
            .csr("ethmac", 18)
            .irq("ethmac", 2)
            .mem("ethmac", 0x3000_0000);
        let once = merge(&soc(), std::slice::from_ref(&layer)).unwrap();
        let twice = merge(&once, &[layer]).unwrap();
        assert_eq!(once.to_entries(), twice.to_entries());
        assert_eq!(
            twice.origin(ResourceKind::RegisterBank, "ethmac"),
            Some("mini")
        );
    }

    #[test]
    fn out_of_range_index_rejected() {
        let overlay = ResourceLayer::new("board").csr("huge", 32);
        let err = merge(&soc(), &[overlay]).unwrap_err();
        assert!(matches!(err, ResourceError::OutOfRange { limit: 32, .. }));

        let limits = ResourceLimits {
            register_banks: 64,
            interrupts: 32,
        };
        let overlay = ResourceLayer::new("board").csr("huge", 32);
        assert!(merge_with_limits(&soc(), &[overlay], &limits).is_ok());
    }

    #[test]
    fn memory_bases_are_unbounded() {
        let overlay = ResourceLayer::new("board").mem("far", 0xF000_0000);
        assert!(merge(&soc(), &[overlay]).is_ok());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let t = merge(&soc(), &[ResourceLayer::new("x").csr("leds", 6)]).unwrap();
        let names: Vec<_> = t
            .entries(ResourceKind::RegisterBank)
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["crg", "uart", "leds"]);
    }
}
