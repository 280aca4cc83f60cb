//! Composition errors.

use thiserror::Error;

use socplan_clock::ClockError;
use socplan_resources::ResourceError;

/// Errors raised while installing subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("subsystem '{subsystem}' binds '{port}' to signal '{signal}', which nothing installed produces")]
    UnresolvedSignal {
        subsystem: String,
        port: String,
        signal: String,
    },

    #[error("subsystem '{subsystem}' runs in clock domain '{domain}', which does not exist")]
    UnresolvedDomain { subsystem: String, domain: String },

    #[error("signal '{signal}' is produced by both '{first}' and '{second}'")]
    DuplicateSignal {
        signal: String,
        first: String,
        second: String,
    },
}

/// Errors that abort a SoC composition. No partial result is ever returned.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("clock planning failed: {0}")]
    Clock(#[from] ClockError),

    #[error("resource allocation failed: {0}")]
    Resource(#[from] ResourceError),

    #[error("subsystem installation failed: {0}")]
    Install(#[from] InstallError),
}
