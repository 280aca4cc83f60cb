//! SoC variants as data.
//!
//! A variant is a chain of resource layers plus a candidate subsystem list.
//! Deriving a variant appends a layer named after it and may add or replace
//! candidates; nothing is ever removed from the parent.

use serde::Serialize;

use socplan_board::BoardCapabilities;
use socplan_resources::{RegionRequest, ResourceEntry, ResourceLayer};

use crate::catalog;
use crate::sdram::SdramModule;
use crate::subsystem::SubsystemSpec;

/// A SoC variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SocVariant {
    name: String,
    /// Root layer first, then one layer per derivation step.
    layers: Vec<ResourceLayer>,
    regions: Vec<RegionRequest>,
    candidates: Vec<SubsystemSpec>,
    sys_clk_hz: Option<u64>,
    sdram: Option<SdramModule>,
}

impl SocVariant {
    /// The core SoC every variant derives from.
    pub fn root() -> Self {
        Self {
            name: "soc".into(),
            layers: vec![catalog::soc_defaults()],
            regions: catalog::core_regions(),
            candidates: Vec::new(),
            sys_clk_hz: None,
            sdram: None,
        }
    }

    /// Derive a new variant. Its own layer starts empty.
    pub fn extend(&self, name: &str) -> Self {
        let mut derived = self.clone();
        derived.name = name.into();
        derived.layers.push(ResourceLayer::new(name));
        derived
    }

    /// Add an assignment to this variant's own layer.
    pub fn with_resource(mut self, entry: ResourceEntry) -> Self {
        if let Some(layer) = self.layers.last_mut() {
            layer.push(entry);
        }
        self
    }

    pub fn with_region(mut self, name: &str, size: u64) -> Self {
        self.regions.push(RegionRequest::new(name, size));
        self
    }

    /// Add a candidate, replacing a same-named one in place.
    pub fn with_candidate(mut self, spec: SubsystemSpec) -> Self {
        match self.candidates.iter_mut().find(|c| c.name == spec.name) {
            Some(slot) => *slot = spec,
            None => self.candidates.push(spec),
        }
        self
    }

    pub fn with_sys_clk(mut self, hz: u64) -> Self {
        self.sys_clk_hz = Some(hz);
        self
    }

    /// Add the external DRAM controller for `module`.
    pub fn with_sdram(mut self, module: SdramModule) -> Self {
        let spec = catalog::sdram(&module);
        self.sdram = Some(module);
        self.with_candidate(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root layer the merge starts from.
    pub fn root_layer(&self) -> &ResourceLayer {
        &self.layers[0]
    }

    /// Derivation layers, parent first.
    pub fn overlays(&self) -> &[ResourceLayer] {
        &self.layers[1..]
    }

    /// Names of the chain from the root to this variant.
    pub fn chain(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.origin.as_str()).collect()
    }

    pub fn regions(&self) -> &[RegionRequest] {
        &self.regions
    }

    pub fn candidates(&self) -> &[SubsystemSpec] {
        &self.candidates
    }

    pub fn candidate(&self, name: &str) -> Option<&SubsystemSpec> {
        self.candidates.iter().find(|c| c.name == name)
    }

    /// System clock the variant was designed for, if it pins one.
    pub fn sys_clk_hz(&self) -> Option<u64> {
        self.sys_clk_hz
    }

    /// DRAM part behind the external memory candidate.
    pub fn sdram_module(&self) -> Option<&SdramModule> {
        self.sdram.as_ref()
    }

    /// Firmware RAM, integrated main RAM or external DDR3, at 75 MHz.
    pub fn base(caps: &BoardCapabilities, firmware_ram_size: u64) -> Self {
        Self::root()
            .extend("base")
            .with_resource(ResourceEntry::mem("firmware_ram", catalog::FIRMWARE_RAM_BASE))
            .with_sys_clk(75_000_000)
            .with_candidate(catalog::firmware_ram(firmware_ram_size))
            .with_candidate(catalog::integrated_main_ram(caps.integrated_main_ram_bytes))
            .with_sdram(SdramModule::mt41j128m16())
    }

    /// Base plus Ethernet.
    pub fn mini(caps: &BoardCapabilities, firmware_ram_size: u64) -> Self {
        Self::base(caps, firmware_ram_size)
            .extend("mini")
            .with_candidate(catalog::ethphy())
            .with_candidate(catalog::ethmac())
    }
}

/// Resolve a built-in variant by name.
pub fn builtin_variant(
    name: &str,
    caps: &BoardCapabilities,
    firmware_ram_size: u64,
) -> Option<SocVariant> {
    match name {
        "base" => Some(SocVariant::base(caps, firmware_ram_size)),
        "mini" => Some(SocVariant::mini(caps, firmware_ram_size)),
        _ => None,
    }
}

/// List all built-in variant names with a short description.
pub fn builtin_variants() -> Vec<(&'static str, &'static str)> {
    vec![
        ("base", "firmware RAM and main memory"),
        ("mini", "base plus MII Ethernet"),
    ]
}
