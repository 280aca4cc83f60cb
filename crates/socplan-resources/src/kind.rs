//! Resource kinds and entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the independent resource namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Control/status register bank index.
    RegisterBank,
    /// Base address of a memory-mapped window.
    MemoryBase,
    /// Interrupt line.
    Interrupt,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::RegisterBank,
        ResourceKind::MemoryBase,
        ResourceKind::Interrupt,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::RegisterBank => write!(f, "csr"),
            ResourceKind::MemoryBase => write!(f, "mem"),
            ResourceKind::Interrupt => write!(f, "irq"),
        }
    }
}

/// A single `(kind, name) -> value` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub kind: ResourceKind,
    pub value: u64,
}

impl ResourceEntry {
    pub fn new(kind: ResourceKind, name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    pub fn csr(name: impl Into<String>, index: u64) -> Self {
        Self::new(ResourceKind::RegisterBank, name, index)
    }

    pub fn mem(name: impl Into<String>, base: u64) -> Self {
        Self::new(ResourceKind::MemoryBase, name, base)
    }

    pub fn irq(name: impl Into<String>, line: u64) -> Self {
        Self::new(ResourceKind::Interrupt, name, line)
    }
}

/// Upper bounds on index-like resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceLimits {
    /// Number of CSR banks the bus decoder can address.
    pub register_banks: u64,
    /// Number of interrupt lines the CPU exposes.
    pub interrupts: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            register_banks: 32,
            interrupts: 32,
        }
    }
}

impl ResourceLimits {
    /// Exclusive upper bound for a kind, if it has one.
    pub fn limit(&self, kind: ResourceKind) -> Option<u64> {
        match kind {
            ResourceKind::RegisterBank => Some(self.register_banks),
            ResourceKind::Interrupt => Some(self.interrupts),
            ResourceKind::MemoryBase => None,
        }
    }
}
