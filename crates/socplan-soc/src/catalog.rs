//! Built-in resource defaults and subsystem candidates.

use socplan_resources::{RegionRequest, ResourceEntry, ResourceLayer};

use crate::condition::{Capability, Condition};
use crate::sdram::SdramModule;
use crate::subsystem::SubsystemSpec;

/// Base address of the firmware RAM window.
pub const FIRMWARE_RAM_BASE: u64 = 0x2000_0000;
/// Firmware RAM size when the composition does not ask for one.
pub const DEFAULT_FIRMWARE_RAM_SIZE: u64 = 0x8000;
/// Base address of the Ethernet MAC buffers.
pub const ETHMAC_BASE: u64 = 0x3000_0000;
/// Size of the Ethernet MAC buffer window.
pub const ETHMAC_REGION_SIZE: u64 = 0x2000;

/// Core SoC assignments every variant starts from.
pub fn soc_defaults() -> ResourceLayer {
    ResourceLayer::new("soc")
        .csr("crg", 0)
        .csr("uart_phy", 1)
        .csr("uart", 2)
        .csr("identifier", 3)
        .csr("timer0", 4)
        .irq("uart", 0)
        .irq("timer0", 1)
        .mem("rom", 0x0000_0000)
        .mem("sram", 0x1000_0000)
        .mem("main_ram", 0x4000_0000)
        .mem("csr", 0x6000_0000)
}

/// Regions of the core SoC.
pub fn core_regions() -> Vec<RegionRequest> {
    vec![
        RegionRequest::new("rom", 0x8000),
        RegionRequest::new("sram", 0x1000),
        RegionRequest::new("csr", 0x0100_0000),
    ]
}

/// On-chip RAM the firmware runs from. Always present.
pub fn firmware_ram(size: u64) -> SubsystemSpec {
    SubsystemSpec::new("firmware_ram", Condition::Always).region("firmware_ram", size)
}

/// Main RAM built from block RAM, for boards that wire it.
pub fn integrated_main_ram(size: u64) -> SubsystemSpec {
    SubsystemSpec::new(
        "integrated_main_ram",
        Condition::flag(Capability::IntegratedMainRam),
    )
    .region("main_ram", size)
}

/// DDR controller and PHY for boards without integrated main RAM.
///
/// The PHY's 4x serdes strobes come from the clock tree; the read strobe is
/// the write strobe under another name.
pub fn sdram(module: &SdramModule) -> SubsystemSpec {
    SubsystemSpec::new("sdram", Condition::flag(Capability::ExternalDramRequired))
        .resource(ResourceEntry::csr("sdram", 8))
        .resource(ResourceEntry::csr("l2_cache", 9))
        .resource(ResourceEntry::csr("ddrphy", 16))
        .region("main_ram", module.size_bytes())
        .bind("clk4x_wr_strb", "write_strobe")
        .bind("clk4x_rd_strb", "read_strobe")
}

/// Signal the Ethernet PHY drives into the MAC.
pub const ETHPHY_SIGNAL: &str = "eth_phy";

/// MII Ethernet PHY. Generates its own rx/tx clocks.
pub fn ethphy() -> SubsystemSpec {
    SubsystemSpec::new("ethphy", Condition::flag(Capability::EthernetPhy))
        .resource(ResourceEntry::csr("ethphy", 17))
        .produce(ETHPHY_SIGNAL)
        .local_domain("eth_rx")
        .local_domain("eth_tx")
}

/// Ethernet MAC with its buffer window, wired to the PHY.
pub fn ethmac() -> SubsystemSpec {
    SubsystemSpec::new("ethmac", Condition::flag(Capability::EthernetPhy))
        .resource(ResourceEntry::csr("ethmac", 18))
        .resource(ResourceEntry::irq("ethmac", 2))
        .resource(ResourceEntry::mem("ethmac", ETHMAC_BASE))
        .region("ethmac", ETHMAC_REGION_SIZE)
        .bind("phy", ETHPHY_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use socplan_resources::{merge, ResourceKind, ResourceTable};

    #[test]
    fn defaults_are_collision_free() {
        let table = ResourceTable::from_layer(&soc_defaults()).unwrap();
        assert_eq!(table.len(ResourceKind::RegisterBank), 5);
        assert_eq!(table.lookup(ResourceKind::MemoryBase, "main_ram"), Some(0x4000_0000));
    }

    #[test]
    fn catalogue_layers_merge_cleanly() {
        let base = ResourceTable::from_layer(&soc_defaults()).unwrap();
        let layers = [
            sdram(&SdramModule::mt41j128m16()).layer(),
            ethphy().layer(),
            ethmac().layer(),
        ];
        let table = merge(&base, &layers).unwrap();
        assert_eq!(table.lookup(ResourceKind::RegisterBank, "ddrphy"), Some(16));
        assert_eq!(table.lookup(ResourceKind::Interrupt, "ethmac"), Some(2));
        assert_eq!(table.origin(ResourceKind::RegisterBank, "ethmac"), Some("ethmac"));
        assert_eq!(table.origin(ResourceKind::RegisterBank, "ethphy"), Some("ethphy"));
    }

    #[test]
    fn sdram_region_matches_module() {
        let spec = sdram(&SdramModule::mt41j128m16());
        assert_eq!(spec.regions, [RegionRequest::new("main_ram", 0x1000_0000)]);
        assert_eq!(spec.cross_signals.len(), 2);
    }
}
