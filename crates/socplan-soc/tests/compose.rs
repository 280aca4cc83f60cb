//! End-to-end composition of the built-in board and variants.

use socplan_board::{BoardCapabilities, BoardDescriptor};
use socplan_clock::{plan, ClockDomainGraph, ClockTopology, DomainRole};
use socplan_resources::{ResourceEntry, ResourceError, ResourceKind};
use socplan_soc::catalog;
use socplan_soc::sdram::SdramModule;
use socplan_soc::{
    compose, install, ComposeConfig, ComposeError, InstallError, SignalSource, SocVariant,
};

fn board(integrated_ram: u64, ethernet: bool) -> BoardDescriptor {
    BoardDescriptor::opsis().with_capabilities(BoardCapabilities {
        integrated_main_ram_bytes: integrated_ram,
        ethernet_phy: ethernet,
    })
}

fn mini(board: BoardDescriptor) -> ComposeConfig {
    let variant = SocVariant::mini(&board.capabilities, catalog::DEFAULT_FIRMWARE_RAM_SIZE);
    ComposeConfig::new(board, variant)
}

#[test]
fn system_clock_is_exact_at_75_mhz() {
    let soc = compose(&mini(BoardDescriptor::opsis())).unwrap();
    let p = soc.plan();
    assert_eq!(p.reference_hz, 100_000_000);
    assert!(p.is_exact());
    assert_eq!(p.achieved_hz(), 75_000_000);
    assert_eq!(p.post_divide, 8);

    let sys = soc.clocks().by_role(DomainRole::System).unwrap();
    assert_eq!(sys.frequency_hz, 75_000_000);
    let aux = soc.clocks().by_role(DomainRole::Auxiliary).unwrap();
    assert_eq!(aux.frequency_hz, 50_000_000);
}

#[test]
fn firmware_and_ethernet_windows_coexist() {
    let soc = compose(&mini(BoardDescriptor::opsis())).unwrap();
    let map = soc.memory_map();

    let fw = map.region("firmware_ram").unwrap();
    assert_eq!((fw.base_address, fw.size), (0x2000_0000, 0x8000));
    assert_eq!(fw.shadow_address, 0xA000_0000);

    let eth = map.region("ethmac").unwrap();
    assert_eq!((eth.base_address, eth.size), (0x3000_0000, 0x2000));
    assert_eq!(eth.shadow_address, 0xB000_0000);

    assert_eq!(map.find(0xB000_0100).unwrap().name, "ethmac");
}

#[test]
fn region_inside_firmware_ram_is_rejected() {
    let b = BoardDescriptor::opsis();
    let variant = SocVariant::mini(&b.capabilities, 0x8000)
        .extend("scratch")
        .with_resource(ResourceEntry::mem("scratch", 0x2000_4000))
        .with_region("scratch", 0x1000);
    let err = compose(&ComposeConfig::new(b, variant)).unwrap_err();
    match err {
        ComposeError::Resource(ResourceError::RegionOverlap { existing, incoming, .. }) => {
            // Variant regions are registered before subsystem regions.
            assert_eq!(existing, "scratch");
            assert_eq!(incoming, "firmware_ram");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn network_variant_without_integrated_ram_installs_dram() {
    let soc = compose(&mini(board(0, true))).unwrap();
    let sdram = soc.subsystem("sdram").unwrap();
    let resources = soc.resources();
    assert_eq!(resources.lookup(ResourceKind::RegisterBank, "ddrphy"), Some(16));
    assert_eq!(resources.lookup(ResourceKind::RegisterBank, "ethmac"), Some(18));
    assert_eq!(resources.origin(ResourceKind::RegisterBank, "sdram"), Some("sdram"));

    // Both PHY strobes are the one strobe the clock tree produced.
    let strobe = soc.clocks().signal("write_strobe").unwrap();
    let strobe = SignalSource::Clock(strobe);
    assert_eq!(sdram.binding("clk4x_wr_strb"), Some(&strobe));
    assert_eq!(sdram.binding("clk4x_rd_strb"), Some(&strobe));

    let main_ram = soc.memory_map().region("main_ram").unwrap();
    assert_eq!(main_ram.size, 256 * 1024 * 1024);
}

#[test]
fn integrated_ram_omits_dram_and_its_resources() {
    let soc = compose(&mini(board(0x4000, true))).unwrap();
    assert!(soc.subsystem("sdram").is_none());
    assert!(soc.subsystem("integrated_main_ram").is_some());
    assert!(soc.sdram_timings().is_none());

    let resources = soc.resources();
    for name in ["sdram", "l2_cache", "ddrphy"] {
        assert!(!resources.contains(ResourceKind::RegisterBank, name), "{name}");
    }
    assert_eq!(soc.memory_map().region("main_ram").unwrap().size, 0x4000);
    assert!(soc.subsystem("ethmac").is_some());
}

#[test]
fn strobe_binding_fails_without_memory_taps() {
    let topology = ClockTopology::spartan6().without_memory();
    let p = plan(100_000_000, 75_000_000, &topology).unwrap();
    let graph = ClockDomainGraph::build(&p, &topology).unwrap();

    let candidates = [catalog::sdram(&SdramModule::mt41j128m16())];
    let err = install(&board(0, false).capabilities, &candidates, &graph).unwrap_err();
    assert!(matches!(
        err,
        InstallError::UnresolvedSignal { ref signal, .. } if signal == "write_strobe"
    ));

    // The same failure surfaces through the whole pipeline.
    let mut b = board(0, false);
    b.topology = topology;
    let err = compose(&mini(b)).unwrap_err();
    assert!(matches!(err, ComposeError::Install(_)));
}

#[test]
fn composition_is_deterministic() {
    let a = compose(&mini(BoardDescriptor::opsis())).unwrap();
    let b = compose(&mini(BoardDescriptor::opsis())).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

    let other = compose(&mini(board(0x4000, true))).unwrap();
    assert_ne!(a.fingerprint().unwrap(), other.fingerprint().unwrap());
}

#[test]
fn ethernet_clocks_are_false_paths_both_ways() {
    let soc = compose(&mini(BoardDescriptor::opsis())).unwrap();
    let pairs: Vec<(&str, &str)> = soc
        .false_paths()
        .iter()
        .map(|p| (p.from.as_str(), p.to.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("sys", "eth_rx"),
            ("eth_rx", "sys"),
            ("sys", "eth_tx"),
            ("eth_tx", "sys"),
        ]
    );
}

#[test]
fn base_variant_has_no_ethernet() {
    let b = BoardDescriptor::opsis();
    let variant = SocVariant::base(&b.capabilities, 0x8000);
    let soc = compose(&ComposeConfig::new(b, variant)).unwrap();
    assert!(soc.subsystem("ethphy").is_none());
    assert!(soc.subsystem("ethmac").is_none());
    assert!(!soc.resources().contains(ResourceKind::Interrupt, "ethmac"));
    assert_eq!(soc.chain(), ["soc", "base"]);
}

#[test]
fn mac_is_wired_to_phy() {
    let soc = compose(&mini(BoardDescriptor::opsis())).unwrap();
    let mac = soc.subsystem("ethmac").unwrap();
    assert_eq!(
        mac.binding("phy"),
        Some(&SignalSource::Subsystem {
            producer: "ethphy".into(),
            signal: catalog::ETHPHY_SIGNAL.into(),
        })
    );
}

#[test]
fn mac_listed_before_phy_still_resolves() {
    let b = BoardDescriptor::opsis();
    let variant = SocVariant::base(&b.capabilities, 0x8000)
        .extend("mac-first")
        .with_candidate(catalog::ethmac())
        .with_candidate(catalog::ethphy());
    let soc = compose(&ComposeConfig::new(b, variant)).unwrap();
    let names: Vec<&str> = soc.subsystems().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names[names.len() - 2..], ["ethmac", "ethphy"]);
    assert!(matches!(
        soc.subsystem("ethmac").unwrap().binding("phy"),
        Some(SignalSource::Subsystem { producer, .. }) if producer == "ethphy"
    ));
}

#[test]
fn oversized_shadow_offset_is_an_error() {
    let mut b = BoardDescriptor::opsis();
    b.address_space.shadow_offset = u64::MAX;
    assert!(matches!(
        compose(&mini(b)),
        Err(ComposeError::Resource(ResourceError::RegionOutsideWindow { .. }))
    ));
}
