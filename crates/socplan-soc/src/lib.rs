//! SoC composition.
//!
//! Ties the clock planner, the resource merger and the board descriptor
//! together:
//! - **Conditions:** presence predicates over board capability flags
//! - **Installer:** instantiates the subsystems whose condition holds and
//!   wires their cross-signals to the clock tree by name
//! - **Variants:** SoC variants as data (layers plus candidate subsystems)
//! - **Assembly:** the composition pipeline producing a [`ComposedSoc`]

pub mod error;
pub mod condition;
pub mod subsystem;
pub mod install;
pub mod sdram;
pub mod catalog;
pub mod variant;
pub mod assembly;

pub use assembly::{compose, ComposeConfig, ComposedSoc, FalsePath};
pub use condition::{Capability, Condition};
pub use error::{ComposeError, InstallError};
pub use install::{install, Installation};
pub use subsystem::{BoundSignal, SignalBinding, SignalSource, Subsystem, SubsystemSpec};
pub use variant::SocVariant;
