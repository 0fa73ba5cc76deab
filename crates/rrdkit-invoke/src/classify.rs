//! Failure classification for engine output.
//!
//! rrdtool serializes writers to one database through an on-file lock.
//! A concurrent writer shows up as a non-zero exit whose output contains a
//! recognizable substring; that is the only failure worth retrying.
//! Keeping the classifier pure lets the retry policy in `rrdkit` be unit
//! tested without spawning a single process.

/// Substring the engine emits when another process holds the write lock.
pub const LOCK_CONTENTION_SIGNATURE: &str = "could not lock RRD";

/// Classification of a failed engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Lock contention; the same invocation may succeed if retried shortly.
    Transient,
    /// Anything else; retrying will not help.
    Fatal,
}

/// Classifies a failed invocation from its combined stdout/stderr text.
#[must_use]
pub fn classify_failure(combined_output: &str) -> FailureKind {
    if combined_output.contains(LOCK_CONTENTION_SIGNATURE) {
        FailureKind::Transient
    } else {
        FailureKind::Fatal
    }
}
