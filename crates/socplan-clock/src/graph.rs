//! Clock domain graph.
//!
//! Builds the fixed set of clock domains a SoC runs on from one
//! [`FrequencyPlan`]: the system domain, the memory half/full-rate domains,
//! an auxiliary fixed-rate domain and the power-on-reset domain. Domains
//! reference each other by [`DomainId`]; nothing owns another domain.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClockError, Result};
use crate::planner::FrequencyPlan;
use crate::reset::{PorCounter, ReleaseCondition, ResetInputs, ResetPolicy};
use crate::signal::{SignalId, SignalTable};
use crate::topology::{ClockTopology, TapRole};

/// Index of a domain in its [`ClockDomainGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomainId(pub u32);

/// The fixed role a domain plays in the clock tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainRole {
    System,
    MemoryHalf,
    MemoryFullWrite,
    MemoryFullRead,
    Auxiliary,
    PowerOnReset,
}

impl DomainRole {
    /// Canonical domain name.
    pub fn name(self) -> &'static str {
        match self {
            DomainRole::System => "sys",
            DomainRole::MemoryHalf => "sdram_half",
            DomainRole::MemoryFullWrite => "sdram_full_wr",
            DomainRole::MemoryFullRead => "sdram_full_rd",
            DomainRole::Auxiliary => "aux",
            DomainRole::PowerOnReset => "por",
        }
    }
}

impl fmt::Display for DomainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a domain's clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockSource {
    /// An output tap of the main clock primitive.
    Tap(TapRole),
    /// The auxiliary multiply stage on the reference oscillator.
    Auxiliary { multiply: u64, divide: u64 },
    /// The very same clock net as another domain.
    SameAs(DomainId),
}

/// A named clock domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDomain {
    pub id: DomainId,
    pub name: String,
    pub role: DomainRole,
    pub frequency_hz: u64,
    pub phase_degrees: u32,
    pub source: ClockSource,
    /// Domain this one is derived from. `None` means the reference oscillator.
    pub derived_from: Option<DomainId>,
    pub reset_policy: ResetPolicy,
    /// Conditions that must all hold for the domain to leave reset.
    pub reset: Vec<ReleaseCondition>,
}

impl ClockDomain {
    /// Clock period in picoseconds, truncated.
    pub fn period_ps(&self) -> u64 {
        1_000_000_000_000 / self.frequency_hz
    }
}

/// One active output of the clock primitive, for the emission layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TapOutput {
    pub role: TapRole,
    pub divide: u64,
    pub phase_degrees: u32,
    pub frequency_hz: u64,
}

/// The composed clock tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDomainGraph {
    plan: FrequencyPlan,
    domains: Vec<ClockDomain>,
    taps: Vec<TapOutput>,
    signals: SignalTable,
    por_counter_bits: u32,
}

struct Builder<'a> {
    plan: &'a FrequencyPlan,
    topology: &'a ClockTopology,
    domains: Vec<ClockDomain>,
    taps: Vec<TapOutput>,
}

impl Builder<'_> {
    fn tap(&mut self, role: TapRole) -> Result<(u64, u32)> {
        let tap = self
            .topology
            .tap(role)
            .ok_or_else(|| ClockError::InvalidTopology {
                detail: format!("topology {} has no {role:?} tap", self.topology.name),
            })?;
        let divide = self.topology.tap_divide(tap);
        let vco = self.plan.vco_hz();
        if vco % divide != 0 {
            return Err(ClockError::FrequencyMismatch {
                reference_hz: self.plan.reference_hz,
                target_hz: self.plan.target_hz,
                detail: format!("VCO {vco} Hz is not divisible by tap {role:?} divider {divide}"),
            });
        }
        let frequency_hz = vco / divide;
        self.taps.push(TapOutput {
            role,
            divide,
            phase_degrees: tap.phase_degrees,
            frequency_hz,
        });
        Ok((frequency_hz, tap.phase_degrees))
    }

    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        role: DomainRole,
        frequency_hz: u64,
        phase_degrees: u32,
        source: ClockSource,
        derived_from: Option<DomainId>,
        reset_policy: ResetPolicy,
        reset: Vec<ReleaseCondition>,
    ) -> DomainId {
        let id = DomainId(self.domains.len() as u32);
        self.domains.push(ClockDomain {
            id,
            name: role.name().into(),
            role,
            frequency_hz,
            phase_degrees,
            source,
            derived_from,
            reset_policy,
            reset,
        });
        id
    }
}

impl ClockDomainGraph {
    /// Build the domain graph for a frequency plan on the given topology.
    pub fn build(plan: &FrequencyPlan, topology: &ClockTopology) -> Result<Self> {
        topology.validate()?;
        if plan.post_divide != topology.post_divide {
            return Err(ClockError::InvalidTopology {
                detail: format!(
                    "plan post-divide {} does not match topology {} post-divide {}",
                    plan.post_divide, topology.name, topology.post_divide
                ),
            });
        }
        if !plan.is_exact() {
            return Err(ClockError::FrequencyMismatch {
                reference_hz: plan.reference_hz,
                target_hz: plan.target_hz,
                detail: "plan does not reproduce its target exactly".into(),
            });
        }

        let mut signals = SignalTable::new();
        let external_reset = signals.produce("external_reset", "board");
        let pll_locked = signals.produce("pll_locked", "pll");
        let aux_locked = signals.produce("aux_locked", "aux");

        let mut b = Builder {
            plan,
            topology,
            domains: Vec::new(),
            taps: Vec::new(),
        };

        // The system domain's reset waits on the POR domain, which is
        // registered right after it and therefore gets id 1.
        let por_id = DomainId(1);
        let (sys_hz, sys_phase) = b.tap(TapRole::System)?;
        let sys = b.add(
            DomainRole::System,
            sys_hz,
            sys_phase,
            ClockSource::Tap(TapRole::System),
            None,
            ResetPolicy::CountedPowerOnDelay,
            vec![
                ReleaseCondition::DomainReleased(por_id),
                ReleaseCondition::PorExpired,
                ReleaseCondition::Locked(pll_locked),
            ],
        );
        let por = b.add(
            DomainRole::PowerOnReset,
            sys_hz,
            sys_phase,
            ClockSource::SameAs(sys),
            Some(sys),
            ResetPolicy::AsynchronousToSelf,
            vec![ReleaseCondition::ExternalReleased(external_reset)],
        );
        debug_assert_eq!(por, por_id);

        if topology.memory_clocking {
            let (half_hz, half_phase) = b.tap(TapRole::MemoryHalf)?;
            b.add(
                DomainRole::MemoryHalf,
                half_hz,
                half_phase,
                ClockSource::Tap(TapRole::MemoryHalf),
                Some(sys),
                ResetPolicy::AsynchronousToSystem,
                vec![ReleaseCondition::DomainReleased(sys)],
            );

            let (wr_hz, wr_phase) = b.tap(TapRole::MemoryWrite)?;
            let wr = b.add(
                DomainRole::MemoryFullWrite,
                wr_hz,
                wr_phase,
                ClockSource::Tap(TapRole::MemoryWrite),
                Some(sys),
                ResetPolicy::AsynchronousToSystem,
                vec![ReleaseCondition::DomainReleased(sys)],
            );
            b.add(
                DomainRole::MemoryFullRead,
                wr_hz,
                wr_phase,
                ClockSource::SameAs(wr),
                Some(wr),
                ResetPolicy::AsynchronousToSystem,
                vec![ReleaseCondition::DomainReleased(sys)],
            );

            let strobe = signals.produce("write_strobe", "pll");
            signals.alias("read_strobe", strobe);

            b.tap(TapRole::DramClockForward)?;
            signals.produce("dram_clock_out", "pll");
        }

        let aux = topology.auxiliary;
        let aux_num = plan.reference_hz as u128 * aux.multiply as u128;
        if aux_num % aux.divide as u128 != 0 {
            return Err(ClockError::FrequencyMismatch {
                reference_hz: plan.reference_hz,
                target_hz: (aux_num / aux.divide as u128) as u64,
                detail: format!(
                    "auxiliary stage x{}/{} is not exact",
                    aux.multiply, aux.divide
                ),
            });
        }
        b.add(
            DomainRole::Auxiliary,
            (aux_num / aux.divide as u128) as u64,
            0,
            ClockSource::Auxiliary {
                multiply: aux.multiply,
                divide: aux.divide,
            },
            None,
            ResetPolicy::AsynchronousToSystem,
            vec![
                ReleaseCondition::DomainReleased(sys),
                ReleaseCondition::Locked(aux_locked),
            ],
        );

        log::debug!(
            "built clock graph: {} domains, {} taps, {} signals",
            b.domains.len(),
            b.taps.len(),
            signals.len()
        );

        Ok(Self {
            plan: *plan,
            domains: b.domains,
            taps: b.taps,
            signals,
            por_counter_bits: topology.por_counter_bits,
        })
    }

    /// The plan the graph was built from.
    pub fn plan(&self) -> &FrequencyPlan {
        &self.plan
    }

    pub fn domains(&self) -> impl Iterator<Item = &ClockDomain> {
        self.domains.iter()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn get(&self, id: DomainId) -> Option<&ClockDomain> {
        self.domains.get(id.0 as usize)
    }

    /// Look up a domain by name.
    pub fn domain(&self, name: &str) -> Option<&ClockDomain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Look up a domain by role.
    pub fn by_role(&self, role: DomainRole) -> Option<&ClockDomain> {
        self.domains.iter().find(|d| d.role == role)
    }

    /// Active tap outputs in the order they were wired.
    pub fn taps(&self) -> &[TapOutput] {
        &self.taps
    }

    pub fn signals(&self) -> &SignalTable {
        &self.signals
    }

    /// Resolve a signal name produced by the clock tree.
    pub fn signal(&self, name: &str) -> Option<SignalId> {
        self.signals.lookup(name)
    }

    /// Fresh power-on-reset counter for this tree.
    pub fn por_counter(&self) -> PorCounter {
        PorCounter::new(self.por_counter_bits)
    }

    /// Follow `SameAs` links to the domain that actually drives the clock net.
    pub fn clock_root(&self, id: DomainId) -> DomainId {
        let mut current = id;
        for _ in 0..self.domains.len() {
            match self.get(current).map(|d| d.source) {
                Some(ClockSource::SameAs(next)) => current = next,
                _ => break,
            }
        }
        current
    }

    /// Every leaf condition that must hold before `id` leaves reset.
    pub fn ready_conditions(&self, id: DomainId) -> BTreeSet<ReleaseCondition> {
        let mut leaves = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(domain) = self.get(current) else {
                continue;
            };
            for &condition in &domain.reset {
                match condition {
                    ReleaseCondition::DomainReleased(other) => stack.push(other),
                    leaf => {
                        leaves.insert(leaf);
                    }
                }
            }
        }
        leaves
    }

    /// Whether `id` is out of reset under the observed inputs.
    pub fn is_ready(&self, id: DomainId, inputs: &ResetInputs) -> bool {
        self.ready_conditions(id)
            .into_iter()
            .all(|c| inputs.satisfies(c))
    }
}
