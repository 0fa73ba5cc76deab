//! Validated command construction and execution.
//!
//! Arguments are passed straight to `execve` with no shell in between, so
//! injection is structurally impossible; validation here rejects the few
//! characters (NUL, CR, LF) that can still corrupt an argument vector or
//! the engine's own parsing of it.

use std::fmt;
use std::process::Stdio;

use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{InvokeError, Result};

/// Characters that are never allowed in command arguments.
const FORBIDDEN_CHARS: &[char] = &['\0', '\n', '\r'];

/// Validates a single command argument.
///
/// # Errors
///
/// Returns an error if the argument contains a forbidden character.
pub fn validate_argument(arg: &str) -> Result<()> {
    for c in arg.chars() {
        if FORBIDDEN_CHARS.contains(&c) {
            return Err(InvokeError::forbidden_character(arg, c));
        }
    }
    Ok(())
}

/// Output captured from one engine invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
    /// Exit status code (0 for success, -1 if killed by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Get stdout as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Get stderr as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Get stdout followed by stderr as one lossy string.
    ///
    /// This is the text failure classification and error reporting run
    /// against; the engine spreads diagnostics across both streams.
    #[must_use]
    pub fn combined_lossy(&self) -> String {
        let mut combined = self.stdout_lossy();
        combined.push_str(&self.stderr_lossy());
        combined
    }

    /// Check if the invocation succeeded (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A builder for one engine invocation.
///
/// Collects validated arguments and executes the binary directly (never via
/// a shell). Validation failures are deferred to [`execute`](Self::execute)
/// so the builder chain stays infallible.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> rrdkit_invoke::Result<()> {
/// use rrdkit_invoke::RrdCommand;
///
/// let output = RrdCommand::new("rrdtool")
///     .args(["create", "./net.rrd", "--step", "60"])
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RrdCommand {
    binary: String,
    args: Vec<String>,
    validation_errors: Vec<InvokeError>,
}

impl RrdCommand {
    /// Create a new command for the given binary name or path.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            validation_errors: Vec::new(),
        }
    }

    /// Add a single argument, validated for safety.
    #[must_use]
    pub fn arg(mut self, arg: &str) -> Self {
        match validate_argument(arg) {
            Ok(()) => self.args.push(arg.to_string()),
            Err(e) => self.validation_errors.push(e),
        }
        self
    }

    /// Add multiple arguments, each validated for safety.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self = self.arg(arg.as_ref());
        }
        self
    }

    /// Check if there are any validation errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.validation_errors.is_empty()
    }

    /// Execute the command and capture its output.
    ///
    /// A non-zero exit is *not* an error here; the caller inspects
    /// [`CommandOutput::success`] because some failures are retried.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument failed validation or the binary
    /// could not be launched.
    pub async fn execute(mut self) -> Result<CommandOutput> {
        if !self.validation_errors.is_empty() {
            return Err(self.validation_errors.swap_remove(0));
        }

        debug!(command = %self, "invoking engine");

        let output = TokioCommand::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| InvokeError::launch(&self.binary, e))?;

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

impl fmt::Display for RrdCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.binary, self.args.join(" "))
    }
}
