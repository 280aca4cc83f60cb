//! Clock planning for FPGA system-on-chip designs.
//!
//! Turns a single reference oscillator into the clock tree a SoC needs:
//! - **Planner:** exact integer multiply/divide pairs for the system clock
//! - **Topology:** the divider stages and tap layout of the clock primitive
//! - **Graph:** the named clock domains, their shared signals and reset ordering

pub mod error;
pub mod topology;
pub mod planner;
pub mod signal;
pub mod reset;
pub mod graph;

pub use error::{ClockError, Result};
pub use graph::{ClockDomain, ClockDomainGraph, ClockSource, DomainId, DomainRole, TapOutput};
pub use planner::{plan, FrequencyPlan};
pub use reset::{PorCounter, ReleaseCondition, ResetInputs, ResetPolicy};
pub use signal::{SignalId, SignalTable};
pub use topology::{AuxiliaryStage, ClockTap, ClockTopology, TapRole};
