//! Error types
//!
//! Every failure here is a programming or data-integrity defect, never a
//! transient condition, so nothing is retried.

/// Problems found while validating parameters or scheduler configuration.
///
/// Only produced at construction (or deserialization) time. A value that
/// constructed successfully never yields one of these later.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Weight vector and bound vectors differ in length
    #[error("Expected {expected} parameters, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// A weight falls outside its declared bound
    #[error("Parameter[{index}]={value} is out of bounds. Range: ({lower}, {upper})")]
    OutOfBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// Desired retention must lie in (0, 1]
    #[error("Desired retention must be in (0, 1], got {0}")]
    DesiredRetention(f64),
    /// Maximum interval must be at least one day
    #[error("Maximum interval must be positive")]
    MaximumInterval,
    /// Learning or relearning step with a negative duration
    #[error("{kind} step {index} has a negative duration")]
    NegativeStep { kind: &'static str, index: usize },
}

/// Errors surfaced by the scheduling engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FsrsError {
    /// Invalid weights, bounds or scheduler options
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// Card state without transition logic, or an unknown state ordinal
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Rating ordinal outside 1..=4, malformed card record, mismatched log
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Engine result type
pub type Result<T> = std::result::Result<T, FsrsError>;
