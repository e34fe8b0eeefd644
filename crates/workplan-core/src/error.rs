//! Core error types for workplan-core.
//!
//! The scheduling engine itself is infallible: infeasible work simply stays
//! unplaced and is reported through [`crate::ScheduleOutcome`]. These errors
//! cover everything around it (loading settings and backlogs from disk,
//! and validating settings before a run).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for workplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML decoding errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML encoding errors
    #[error("TOML encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load a settings or backlog file
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save a settings file
    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// File extension is not one we know how to parse
    #[error("Unsupported file format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    /// Home directory could not be resolved
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Validation errors for work settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A clock time that is not `HH:mm`
    #[error("Invalid clock time for '{field}': '{value}' (expected HH:mm)")]
    InvalidClockTime { field: String, value: String },

    /// Window or interval whose end is not after its start
    #[error("Invalid time range for '{field}': end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        field: String,
        start: String,
        end: String,
    },

    /// Lunch falls outside the window it belongs to
    #[error("Lunch for '{field}' ({start} +{minutes}m) falls outside the work window")]
    LunchOutsideWindow {
        field: String,
        start: String,
        minutes: u32,
    },

    /// Negative or non-finite budget
    #[error("Invalid capacity budget for '{field}': {hours}h")]
    InvalidBudget { field: String, hours: f64 },

    /// One-off blocked interval without a date
    #[error("Blocked time '{name}' recurs 'none' but has no date")]
    MissingDate { name: String },

    /// Weekly blocked interval with neither weekdays nor an anchor date
    #[error("Blocked time '{name}' recurs weekly but names no days and no date")]
    MissingWeekdays { name: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
