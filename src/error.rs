//! Typed errors for the goal pipeline.
//!
//! Presentation layers never see these directly: validation and dispatch errors
//! are folded into `DispatchOutcome::Failed` with their display text as reason.

use std::path::PathBuf;
use thiserror::Error;

/// Input rejected by the goal builder. No dispatch is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please enter a target_map.")]
    EmptyMap,

    #[error("target_map must not contain control characters")]
    InvalidMapCharacter,

    #[error("{axis} must be a finite number")]
    NonFiniteCoordinate { axis: &'static str },

    #[error("{axis} = {value} is outside [{min}, {max}]")]
    CoordinateOutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// The publish command could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Failed to publish: {0}")]
    LaunchFailure(String),

    #[error("invalid transport command: {0}")]
    InvalidTemplate(String),
}

/// A payload did not match the action goal wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has invalid value `{value}`")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("transport_command must not be empty")]
    EmptyTransportCommand,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// A failed dispatch whose reason has already been written to the user's
/// output; the process only needs to exit non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ReportedFailure(pub String);
