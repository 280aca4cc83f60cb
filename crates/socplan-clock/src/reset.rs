//! Reset policies and release ordering.
//!
//! Every domain is held in reset while any of its release conditions is
//! unmet. Conditions compose by OR on the reset side: a domain that follows
//! the system reset inherits all of the system domain's conditions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::DomainId;
use crate::signal::SignalId;

/// How a domain's reset is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Synchronized from an external input into the domain itself.
    AsynchronousToSelf,
    /// Follows the system reset, possibly OR'd with a local lock-lost.
    AsynchronousToSystem,
    /// Held until the power-on counter expires and the PLL locks.
    CountedPowerOnDelay,
}

/// Something that must hold before a domain leaves reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseCondition {
    /// The external reset input is deasserted.
    ExternalReleased(SignalId),
    /// A lock signal is asserted.
    Locked(SignalId),
    /// The power-on-reset counter reached zero.
    PorExpired,
    /// Another domain is out of reset.
    DomainReleased(DomainId),
}

/// Saturating power-on-reset down-counter.
///
/// Starts at `2^bits - 1`, decrements once per system clock and sticks at
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PorCounter {
    bits: u32,
    count: u64,
}

impl PorCounter {
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            count: Self::initial_count(bits),
        }
    }

    /// Value the counter is reset to.
    pub fn initial_count(bits: u32) -> u64 {
        (1u64 << bits) - 1
    }

    /// Counter width in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Current count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of system cycles the counter holds reset.
    pub fn hold_cycles(&self) -> u64 {
        Self::initial_count(self.bits)
    }

    /// Advance one system clock.
    pub fn tick(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    /// Advance `n` system clocks.
    pub fn advance(&mut self, n: u64) {
        self.count = self.count.saturating_sub(n);
    }

    pub fn expired(&self) -> bool {
        self.count == 0
    }

    /// Re-arm after the POR domain itself is reset.
    pub fn rearm(&mut self) {
        self.count = Self::initial_count(self.bits);
    }
}

/// Observed state of every leaf release condition.
#[derive(Debug, Clone)]
pub struct ResetInputs {
    /// Whether the external reset input is asserted.
    pub external_reset: bool,
    /// Lock signals currently asserted.
    pub locked: BTreeSet<SignalId>,
    /// Power-on-reset counter.
    pub por: PorCounter,
}

impl ResetInputs {
    /// Power-up state: nothing locked, counter full, external reset released.
    pub fn power_up(por_bits: u32) -> Self {
        Self {
            external_reset: false,
            locked: BTreeSet::new(),
            por: PorCounter::new(por_bits),
        }
    }

    /// Whether a single leaf condition is satisfied.
    ///
    /// `DomainReleased` is never a leaf; callers expand it first.
    pub fn satisfies(&self, condition: ReleaseCondition) -> bool {
        match condition {
            ReleaseCondition::ExternalReleased(_) => !self.external_reset,
            ReleaseCondition::Locked(sig) => self.locked.contains(&sig),
            ReleaseCondition::PorExpired => self.por.expired(),
            ReleaseCondition::DomainReleased(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_saturates_at_zero() {
        let mut por = PorCounter::new(11);
        assert_eq!(por.count(), 2047);
        assert_eq!(por.hold_cycles(), 2047);
        por.advance(2046);
        assert!(!por.expired());
        por.tick();
        assert!(por.expired());
        por.tick();
        assert_eq!(por.count(), 0);
    }

    #[test]
    fn rearm_restores_full_count() {
        let mut por = PorCounter::new(4);
        por.advance(100);
        assert!(por.expired());
        por.rearm();
        assert_eq!(por.count(), 15);
    }

    #[test]
    fn leaf_conditions() {
        let mut inputs = ResetInputs::power_up(2);
        let lock = SignalId(0);
        assert!(!inputs.satisfies(ReleaseCondition::Locked(lock)));
        assert!(!inputs.satisfies(ReleaseCondition::PorExpired));
        assert!(inputs.satisfies(ReleaseCondition::ExternalReleased(SignalId(1))));
        inputs.locked.insert(lock);
        inputs.por.advance(3);
        assert!(inputs.satisfies(ReleaseCondition::Locked(lock)));
        assert!(inputs.satisfies(ReleaseCondition::PorExpired));
    }
}
