//! Resource maps for FPGA system-on-chip designs.
//!
//! Three independent namespaces are allocated across the SoC:
//! - **Register banks:** the CSR bank index of each peripheral
//! - **Memory bases:** the base address of each bus slave window
//! - **Interrupts:** the interrupt line of each peripheral
//!
//! Tables are built by layering overlays on a base table; a later layer
//! shadows an earlier one on name collisions, and every namespace must stay
//! injective after the merge.

pub mod error;
pub mod kind;
pub mod table;
pub mod region;

pub use error::{ResourceError, Result};
pub use kind::{ResourceEntry, ResourceKind, ResourceLimits};
pub use region::{AddressSpace, MemoryMap, MemoryRegion, RegionRequest};
pub use table::{merge, merge_with_limits, Assignment, ResourceLayer, ResourceTable};
