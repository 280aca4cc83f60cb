//! Board descriptor model.
//!
//! Collects the reference oscillator, capability flags and primitive
//! constants of one FPGA board into the description the SoC composer
//! consumes.

use serde::{Deserialize, Serialize};

use socplan_clock::ClockTopology;
use socplan_resources::{AddressSpace, ResourceLimits};

/// Optional hardware the board has already wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardCapabilities {
    /// Size of on-chip main RAM in bytes; zero if the board relies on DRAM.
    #[serde(default)]
    pub integrated_main_ram_bytes: u64,
    /// Whether an Ethernet PHY is connected.
    #[serde(default)]
    pub ethernet_phy: bool,
}

impl BoardCapabilities {
    pub fn has_integrated_main_ram(&self) -> bool {
        self.integrated_main_ram_bytes > 0
    }

    /// An external DRAM controller is needed exactly when no main RAM is wired.
    pub fn external_dram_required(&self) -> bool {
        !self.has_integrated_main_ram()
    }
}

/// A complete board description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardDescriptor {
    /// Board name (e.g., "opsis").
    pub name: String,
    /// Descriptor version.
    pub version: String,
    /// Reference oscillator frequency in Hz.
    pub reference_clock_hz: u64,
    /// System clock used when a composition does not ask for one.
    pub default_sys_clk_hz: u64,
    /// Capability flags.
    pub capabilities: BoardCapabilities,
    /// Clock primitive topology.
    pub topology: ClockTopology,
    /// Shadow window and addressing granularity.
    #[serde(default)]
    pub address_space: AddressSpace,
    /// CSR bank and interrupt line bounds.
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl BoardDescriptor {
    /// Construct the Numato Opsis board: Spartan-6, 100 MHz oscillator,
    /// external DDR3 and an MII Ethernet PHY.
    pub fn opsis() -> Self {
        Self {
            name: "opsis".into(),
            version: "1.0".into(),
            reference_clock_hz: 100_000_000,
            default_sys_clk_hz: 75_000_000,
            capabilities: BoardCapabilities {
                integrated_main_ram_bytes: 0,
                ethernet_phy: true,
            },
            topology: ClockTopology::spartan6(),
            address_space: AddressSpace::default(),
            limits: ResourceLimits::default(),
        }
    }

    /// Same board with capability flags replaced.
    pub fn with_capabilities(mut self, capabilities: BoardCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Resolve a built-in board by name.
pub fn builtin_board(name: &str) -> Option<BoardDescriptor> {
    match name {
        "opsis" => Some(BoardDescriptor::opsis()),
        _ => None,
    }
}

/// List all built-in board names with a short description.
pub fn builtin_boards() -> Vec<(&'static str, &'static str)> {
    vec![(
        "opsis",
        "Numato Opsis (Spartan-6, 100 MHz, DDR3, MII Ethernet)",
    )]
}
