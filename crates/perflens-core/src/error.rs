//! Error types for the perflens data model and pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for perflens operations.
pub type Result<T> = std::result::Result<T, PerflensError>;

/// Errors that can occur while loading configs or running the pipelines.
///
/// Per-run tool failures are *not* errors — they are `ResultSet`s with
/// `error` set. This enum covers the fail-fast preconditions: bad configs,
/// unknown tool names, and artifact-repository acquisition failures.
#[derive(Debug, Error)]
pub enum PerflensError {
    /// Workload config file not found or unreadable.
    #[error("Workload config not found: {path}")]
    ConfigNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// Workload config failed to parse.
    #[error("Malformed workload config {path}: {reason}")]
    MalformedConfig {
        /// Path of the offending file.
        path: PathBuf,
        /// Parse failure detail.
        reason: String,
    },

    /// Requested tool name has no registered adapter.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// Name as given on the command line.
        name: String,
    },

    /// Tool exists but declines the workload.
    #[error("Tool '{tool}' does not support workload '{workload}'")]
    UnsupportedWorkload {
        /// Adapter name.
        tool: String,
        /// Workload spec name.
        workload: String,
    },

    /// External artifact repository could not be acquired at all.
    ///
    /// Fatal for a whole validation run; per-file gaps inside an acquired
    /// repository are NO_DATA outcomes, not this error.
    #[error("Cannot acquire artifact repository at {path}: {reason}")]
    ArtifactAcquisition {
        /// Repository root that was attempted.
        path: PathBuf,
        /// Failure detail.
        reason: String,
    },

    /// I/O error while writing results or reports.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization failure.
    #[error("Serialization error: {source}")]
    Serialize {
        /// Underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}

impl PerflensError {
    /// Create a malformed-config error.
    pub fn malformed_config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown-tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Create an artifact-acquisition error.
    pub fn artifact_acquisition(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactAcquisition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
