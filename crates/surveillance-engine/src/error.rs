//! Error types for surveillance-engine operations.

use thiserror::Error;

use crate::time::WallTime;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A wall-clock string did not parse as `HH:MM` with valid ranges.
    #[error("Invalid time format: {0:?} (expected HH:MM)")]
    InvalidTimeFormat(String),

    /// An exam or window whose start is not strictly before its end.
    #[error("Invalid interval for {subject}: {start}-{end} (start must be before end)")]
    InvalidInterval {
        subject: String,
        start: WallTime,
        end: WallTime,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
