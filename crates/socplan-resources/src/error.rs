//! Resource allocation errors.

use thiserror::Error;

use crate::kind::ResourceKind;

/// Errors that can occur while merging resource tables or registering regions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{kind} value {value:#x} requested by '{incoming}' is already held by '{existing}'")]
    Collision {
        kind: ResourceKind,
        existing: String,
        incoming: String,
        value: u64,
    },

    #[error("{kind} '{name}' value {value} is out of range (limit {limit})")]
    OutOfRange {
        kind: ResourceKind,
        name: String,
        value: u64,
        limit: u64,
    },

    #[error(
        "memory region '{incoming}' ({incoming_base:#010x}+{incoming_size:#x}) overlaps \
         '{existing}' ({existing_base:#010x}+{existing_size:#x})"
    )]
    RegionOverlap {
        existing: String,
        existing_base: u64,
        existing_size: u64,
        incoming: String,
        incoming_base: u64,
        incoming_size: u64,
    },

    #[error("memory region '{name}' size {size:#x} is not a non-zero multiple of {granularity} bytes")]
    UnsatisfiableRegionSize {
        name: String,
        size: u64,
        granularity: u64,
    },

    #[error("memory region '{name}' ({base:#010x}+{size:#x}) does not fit below the shadow window at {shadow_offset:#010x}")]
    RegionOutsideWindow {
        name: String,
        base: u64,
        size: u64,
        shadow_offset: u64,
    },

    #[error("memory region '{name}' has no base address in the memory map")]
    MissingRegionBase { name: String },
}

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;
