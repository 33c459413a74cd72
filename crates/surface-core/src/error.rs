//! Wiring errors raised by the activation and binding core
//!
//! Every variant describes a surface that was composed incorrectly at
//! startup. None of them is produced by a normal sequence of button presses,
//! and nothing in this crate catches or retries them.

use crate::hardware::ButtonId;

/// Error type for feature group and parameter binding operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// `set_active(None)` with no default group configured
    #[error("No group given and no default group is set")]
    MissingDefaultGroup,

    /// `set_temporary` with an ID that was never registered
    #[error("Temporary group '{0}' is not registered")]
    MissingTemporaryGroup(String),

    /// A group ID that is not registered with this manager
    #[error("Group '{0}' is not registered")]
    UnknownGroup(String),

    /// A parameter provider whose size differs from the control count
    #[error("Parameter provider has {actual} parameters but {expected} controls are bound")]
    ProviderSizeMismatch { expected: usize, actual: usize },

    /// A provider was registered against a button the surface does not have
    #[error("No hardware button {0:?} for parameter provider binding")]
    UnknownButtonBinding(ButtonId),
}

/// Convenience alias used across the crate
pub type SurfaceResult<T> = Result<T, SurfaceError>;
