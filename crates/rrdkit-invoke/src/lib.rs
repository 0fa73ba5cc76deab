//! Process-boundary layer for the rrdtool engine.
//!
//! rrdkit drives `rrdtool` exclusively through its command line: every
//! operation is one argument vector handed to a child process, and the only
//! things consumed back are the exit status and the combined
//! stdout/stderr text. This crate owns that boundary:
//!
//! - [`RrdCommand`]: a builder that validates arguments before spawning
//! - [`CommandOutput`]: captured stdout/stderr plus exit code
//! - [`classify_failure`]: a pure classifier separating transient
//!   lock contention from fatal failures, so retry policy can be tested
//!   without spawning anything
//!
//! # Example
//!
//! ```rust,no_run
//! use rrdkit_invoke::RrdCommand;
//!
//! # async fn example() -> rrdkit_invoke::Result<()> {
//! let output = RrdCommand::new("rrdtool")
//!     .arg("fetch")
//!     .arg("./net.rrd")
//!     .arg("AVERAGE")
//!     .execute()
//!     .await?;
//!
//! if output.success() {
//!     println!("{}", output.stdout_lossy());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod command;
pub mod error;

pub use classify::{classify_failure, FailureKind, LOCK_CONTENTION_SIGNATURE};
pub use command::{CommandOutput, RrdCommand};
pub use error::{InvokeError, Result};
