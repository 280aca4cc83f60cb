//! Error types for clock planning.

/// Errors that can occur while planning or building a clock tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// No exact in-bounds multiply/divide pair reproduces the target.
    #[error("cannot reach {target_hz} Hz from a {reference_hz} Hz reference: {detail}")]
    FrequencyMismatch {
        /// Reference oscillator frequency.
        reference_hz: u64,
        /// Requested output frequency.
        target_hz: u64,
        /// What went wrong.
        detail: String,
    },

    /// The clock primitive's configuration cannot produce the fixed tap layout.
    #[error("invalid clock topology: {detail}")]
    InvalidTopology {
        /// Description of the problem.
        detail: String,
    },
}

/// Result type for clock operations.
pub type Result<T> = std::result::Result<T, ClockError>;
