//! Presence conditions over board capability flags.

use serde::{Deserialize, Serialize};

use socplan_board::BoardCapabilities;

/// A single capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// The board wires on-chip main RAM.
    IntegratedMainRam,
    /// The board has no main RAM and needs an external DRAM controller.
    ExternalDramRequired,
    /// An Ethernet PHY is connected.
    EthernetPhy,
}

impl Capability {
    pub fn holds(self, caps: &BoardCapabilities) -> bool {
        match self {
            Capability::IntegratedMainRam => caps.has_integrated_main_ram(),
            Capability::ExternalDramRequired => caps.external_dram_required(),
            Capability::EthernetPhy => caps.ethernet_phy,
        }
    }
}

/// Boolean predicate deciding whether a subsystem is instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Always,
    Flag(Capability),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn flag(capability: Capability) -> Self {
        Condition::Flag(capability)
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Evaluate against a board's capabilities.
    pub fn evaluate(&self, caps: &BoardCapabilities) -> bool {
        match self {
            Condition::Always => true,
            Condition::Flag(c) => c.holds(caps),
            Condition::Not(inner) => !inner.evaluate(caps),
            Condition::All(all) => all.iter().all(|c| c.evaluate(caps)),
            Condition::Any(any) => any.iter().any(|c| c.evaluate(caps)),
        }
    }
}
