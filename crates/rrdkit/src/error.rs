//! Error types for rrdkit operations.

use std::path::PathBuf;

use rrdkit_invoke::InvokeError;
use thiserror::Error;

/// Result type alias for rrdkit operations.
pub type Result<T> = std::result::Result<T, RrdError>;

/// Errors that can occur while driving the engine.
#[derive(Debug, Error)]
pub enum RrdError {
    /// The operation requires an existing database file and none exists.
    ///
    /// Raised before any engine invocation on the fetch path.
    #[error("database not found: {}", path.display())]
    NotFound {
        /// The missing database path.
        path: PathBuf,
    },

    /// A database or graph definition violated a schema invariant.
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// Description of the violated invariant.
        reason: String,
    },

    /// An engine invocation failed: launch failure, non-zero exit, or lock
    /// contention persisting past the retry budget.
    ///
    /// Carries the combined stdout/stderr verbatim so the failure can be
    /// diagnosed without re-running the command.
    #[error("engine invocation failed for '{}': {output}", path.display())]
    CommandFailed {
        /// The database or output path the invocation targeted.
        path: PathBuf,
        /// Combined stdout/stderr of the failed invocation.
        output: String,
        /// The underlying launch or validation error, when the process
        /// never ran at all.
        #[source]
        source: Option<InvokeError>,
    },

    /// Filesystem error preparing for an invocation (directory creation,
    /// existence probe).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RrdError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an `InvalidSchema` error.
    #[must_use]
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            reason: reason.into(),
        }
    }

    /// Creates a `CommandFailed` error.
    #[must_use]
    pub fn command_failed(
        path: impl Into<PathBuf>,
        output: impl Into<String>,
        source: Option<InvokeError>,
    ) -> Self {
        Self::CommandFailed {
            path: path.into(),
            output: output.into(),
            source,
        }
    }

    /// Returns `true` if this error is a missing-database condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this error came out of an engine invocation
    /// rather than local validation.
    #[must_use]
    pub fn is_invocation_error(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}
