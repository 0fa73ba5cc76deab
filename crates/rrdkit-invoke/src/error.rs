//! Error types for process invocation.

use thiserror::Error;

/// Result type alias for invocation operations.
pub type Result<T> = std::result::Result<T, InvokeError>;

/// Errors that can occur while building or launching an engine invocation.
///
/// A non-zero exit from the engine is *not* an `InvokeError`; callers read
/// it from [`CommandOutput::success`](crate::CommandOutput::success) because
/// some failures (lock contention) are retried rather than surfaced.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// An argument contained a character that can corrupt the argument
    /// vector (NUL, CR, LF).
    #[error("argument contains forbidden character {found:?}: {argument}")]
    ForbiddenCharacter {
        /// The offending argument.
        argument: String,
        /// The rejected character.
        found: char,
    },

    /// The engine binary could not be launched at all.
    #[error("failed to launch '{binary}': {source}")]
    Launch {
        /// The binary name or path that was invoked.
        binary: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl InvokeError {
    /// Creates a `ForbiddenCharacter` error.
    #[must_use]
    pub fn forbidden_character(argument: impl Into<String>, found: char) -> Self {
        Self::ForbiddenCharacter {
            argument: argument.into(),
            found,
        }
    }

    /// Creates a `Launch` error.
    #[must_use]
    pub fn launch(binary: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            binary: binary.into(),
            source,
        }
    }

    /// Returns `true` if this error indicates the binary is missing or
    /// unrunnable rather than a bad argument.
    #[must_use]
    pub fn is_launch_error(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}
