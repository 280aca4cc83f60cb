//! SoC composition pipeline.

use serde::Serialize;
use sha2::{Digest, Sha256};

use socplan_board::BoardDescriptor;
use socplan_clock::{planner, ClockDomainGraph, FrequencyPlan};
use socplan_resources::{merge_with_limits, MemoryMap, ResourceLayer, ResourceTable};

use crate::error::ComposeError;
use crate::install::install;
use crate::sdram::CycleTimings;
use crate::subsystem::Subsystem;
use crate::variant::SocVariant;

/// Inputs of one composition.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    pub board: BoardDescriptor,
    pub variant: SocVariant,
    /// Requested system clock; falls back to the variant's, then the board's.
    pub sys_clk_hz: Option<u64>,
    /// Last-applied layer, e.g. from the project manifest.
    pub overrides: Option<ResourceLayer>,
}

impl ComposeConfig {
    pub fn new(board: BoardDescriptor, variant: SocVariant) -> Self {
        Self {
            board,
            variant,
            sys_clk_hz: None,
            overrides: None,
        }
    }

    pub fn with_sys_clk(mut self, hz: u64) -> Self {
        self.sys_clk_hz = Some(hz);
        self
    }

    pub fn with_overrides(mut self, layer: ResourceLayer) -> Self {
        self.overrides = Some(layer);
        self
    }

    /// System clock the composition will plan for.
    pub fn target_sys_clk_hz(&self) -> u64 {
        self.sys_clk_hz
            .or(self.variant.sys_clk_hz())
            .unwrap_or(self.board.default_sys_clk_hz)
    }
}

/// A timing path the implementation tools must ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FalsePath {
    pub from: String,
    pub to: String,
}

/// A fully composed SoC. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComposedSoc {
    board: String,
    variant: String,
    chain: Vec<String>,
    plan: FrequencyPlan,
    clocks: ClockDomainGraph,
    resources: ResourceTable,
    memory_map: MemoryMap,
    subsystems: Vec<Subsystem>,
    false_paths: Vec<FalsePath>,
    sdram_timings: Option<CycleTimings>,
}

impl ComposedSoc {
    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Variant chain from the root, as applied to the resource table.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn plan(&self) -> &FrequencyPlan {
        &self.plan
    }

    pub fn clocks(&self) -> &ClockDomainGraph {
        &self.clocks
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn memory_map(&self) -> &MemoryMap {
        &self.memory_map
    }

    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    pub fn subsystem(&self, name: &str) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.name == name)
    }

    /// False paths between `sys` and each subsystem-local clock domain.
    pub fn false_paths(&self) -> &[FalsePath] {
        &self.false_paths
    }

    /// DRAM timings in system clock cycles, when external DRAM is installed.
    pub fn sdram_timings(&self) -> Option<&CycleTimings> {
        self.sdram_timings.as_ref()
    }

    /// Pretty-printed JSON description.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 over the compact JSON form, as `sha256:<hex>`.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let json = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&json);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Ok(format!("sha256:{hex}"))
    }
}

fn false_paths(subsystems: &[Subsystem]) -> Vec<FalsePath> {
    let mut paths = Vec::new();
    for domain in subsystems.iter().flat_map(|s| &s.local_domains) {
        paths.push(FalsePath {
            from: "sys".into(),
            to: domain.clone(),
        });
        paths.push(FalsePath {
            from: domain.clone(),
            to: "sys".into(),
        });
    }
    paths
}

/// Compose a SoC:
/// plan -> clock graph -> install -> merge -> memory map -> timing exceptions.
///
/// Any failure aborts the whole composition.
pub fn compose(config: &ComposeConfig) -> Result<ComposedSoc, ComposeError> {
    let board = &config.board;
    let variant = &config.variant;

    // Stage 1: Frequency plan
    let sys_clk_hz = config.target_sys_clk_hz();
    let plan = planner::plan(board.reference_clock_hz, sys_clk_hz, &board.topology)?;

    // Stage 2: Clock domain graph
    let clocks = ClockDomainGraph::build(&plan, &board.topology)?;

    // Stage 3: Conditional subsystems
    let installation = install(&board.capabilities, variant.candidates(), &clocks)?;

    // Stage 4: Resource merge, most specific layer last
    let mut layers = vec![variant.root_layer().clone()];
    layers.extend(variant.overlays().iter().cloned());
    layers.extend(installation.layers.iter().cloned());
    if let Some(overrides) = &config.overrides {
        layers.push(overrides.clone());
    }
    let resources = merge_with_limits(&ResourceTable::new(), &layers, &board.limits)?;

    // Stage 5: Memory map
    let mut memory_map = MemoryMap::new(board.address_space);
    memory_map.register_requests(&resources, variant.regions())?;
    memory_map.register_requests(&resources, &installation.regions)?;

    // Stage 6: Timing exceptions and DRAM timings
    let false_paths = false_paths(&installation.subsystems);
    let sdram_timings = if installation.is_installed("sdram") {
        variant
            .sdram_module()
            .map(|module| module.timings_in_cycles(plan.achieved_hz()))
    } else {
        None
    };

    log::info!(
        "composed {} on {}: {} Hz, {} domains, {} subsystems, {} regions",
        variant.name(),
        board.name,
        plan.achieved_hz(),
        clocks.domain_count(),
        installation.subsystems.len(),
        memory_map.len()
    );

    Ok(ComposedSoc {
        board: board.name.clone(),
        variant: variant.name().into(),
        chain: variant.chain().into_iter().map(str::to_string).collect(),
        plan,
        clocks,
        resources,
        memory_map,
        subsystems: installation.subsystems,
        false_paths,
        sdram_timings,
    })
}
