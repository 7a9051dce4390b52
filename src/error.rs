// Probe and parse error taxonomy. Neither crosses a stage boundary: both are folded
// into a `success: false` record by the probe that hit them.

use thiserror::Error;

/// A single external tool invocation failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The cycle budget ran out before the probe finished.
    #[error("cancelled: cycle budget exhausted")]
    Cancelled,

    #[error("exited with code {code}: {stderr}")]
    Exit { code: i32, stderr: String },
}

/// Tool output did not match the expected grammar.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty output")]
    Empty,

    #[error("{0} not found in output")]
    Missing(&'static str),

    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },

    #[error("{0}")]
    Rejected(String),
}
