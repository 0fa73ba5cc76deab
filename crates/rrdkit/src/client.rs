//! The engine front end: create, update, fetch, and graph operations.
//!
//! Every public operation is one synchronous-from-the-caller's-view awaited
//! child-process invocation; only the update path may issue several, under
//! the bounded lock-contention retry. The client holds no mutable state and
//! can be shared freely across concurrent callers; any serialization of
//! writers to one database is the engine's own file lock.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rrdkit_invoke::{classify_failure, CommandOutput, FailureKind, RrdCommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::args;
use crate::error::{Result, RrdError};
use crate::fetch::{parse_fetch_output, FetchOptions, TimeSeries};
use crate::graph::{graph_args, GraphTemplate, RenderOptions, SubstitutionContext};
use crate::schema::Database;

/// Maximum invocation attempts for one update.
const MAX_UPDATE_ATTEMPTS: u32 = 10;

/// Sleep between attempts when the engine reports lock contention.
///
/// Bounds worst-case blocking to just under a second of sleep plus engine
/// latency.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Engine binary name or path.
    #[serde(default = "default_binary")]
    pub binary: String,
}

fn default_binary() -> String {
    "rrdtool".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

/// A handle for driving the engine.
///
/// # Example
///
/// ```rust,no_run
/// use rrdkit::{Archive, Consolidation, Database, DataSource, DsKind, RrdClient, Scalar};
///
/// # async fn example() -> rrdkit::Result<()> {
/// let client = RrdClient::new();
/// let db = Database::new(60)
///     .data_source(DataSource::standard("x", DsKind::Gauge, 300, 0, Scalar::Unbounded))
///     .archive(Archive::new(Consolidation::Average, 0.5, 1, 600));
///
/// client.create("./x.rrd", &db).await?;
/// client.update("./x.rrd", 1, &[42.0]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RrdClient {
    config: ClientConfig,
}

impl RrdClient {
    /// Creates a client using the `rrdtool` binary from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client from explicit configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Creates a client invoking the given binary name or path.
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                binary: binary.into(),
            },
        }
    }

    /// Creates a database file from its schema definition.
    ///
    /// Create-if-absent: an already existing target path is a successful
    /// no-op with no engine invocation. Containing directories are created
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is invalid, directories cannot be
    /// created, or the engine invocation fails.
    pub async fn create(&self, path: impl AsRef<Path>, db: &Database) -> Result<()> {
        let path = path.as_ref();
        db.validate()?;

        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "database exists, create is a no-op");
            return Ok(());
        }

        ensure_parent_dir(path).await?;

        let output = self.run(path, &args::create_args(path, db)).await?;
        if !output.success() {
            return Err(RrdError::command_failed(path, output.combined_lossy(), None));
        }

        info!(path = %path.display(), step = db.step, "created database");
        Ok(())
    }

    /// Appends a sample timestamped "now" (resolved by the engine).
    ///
    /// `slots` is the database's data-source count: fewer supplied values
    /// pad with unknown markers, excess values are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-transient engine failure, or when lock
    /// contention persists past the attempt budget.
    pub async fn update(&self, path: impl AsRef<Path>, slots: usize, values: &[f64]) -> Result<()> {
        self.update_inner(path.as_ref(), slots, None, values).await
    }

    /// Appends a sample at an explicit instant.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`update`](Self::update).
    pub async fn update_at(
        &self,
        path: impl AsRef<Path>,
        slots: usize,
        at: DateTime<Utc>,
        values: &[f64],
    ) -> Result<()> {
        self.update_inner(path.as_ref(), slots, Some(at), values)
            .await
    }

    async fn update_inner(
        &self,
        path: &Path,
        slots: usize,
        at: Option<DateTime<Utc>>,
        values: &[f64],
    ) -> Result<()> {
        if values.len() > slots {
            warn!(
                path = %path.display(),
                supplied = values.len(),
                slots,
                "dropping excess update values"
            );
        }

        let sample = args::update_sample(slots, at, values);
        let argv = args::update_args(path, &sample);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let output = self.run(path, &argv).await?;
            if output.success() {
                return Ok(());
            }

            let combined = output.combined_lossy();
            if attempt >= MAX_UPDATE_ATTEMPTS
                || classify_failure(&combined) == FailureKind::Fatal
            {
                return Err(RrdError::command_failed(path, combined, None));
            }

            warn!(path = %path.display(), attempt, "database locked, retrying update");
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    /// Fetches a historical range as an aligned time series.
    ///
    /// # Errors
    ///
    /// Returns [`RrdError::NotFound`] (before any invocation) if the
    /// database file does not exist, or `CommandFailed` if the engine
    /// rejects the fetch.
    pub async fn fetch(
        &self,
        path: impl AsRef<Path>,
        options: &FetchOptions,
    ) -> Result<TimeSeries> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(RrdError::not_found(path));
        }

        let output = self.run(path, &args::fetch_args(path, options)).await?;
        if !output.success() {
            return Err(RrdError::command_failed(path, output.combined_lossy(), None));
        }

        Ok(parse_fetch_output(&output.combined_lossy()))
    }

    /// Renders a graph template to the given output path.
    ///
    /// Containing directories for the output path are created first. On any
    /// engine failure no partial image is assumed usable.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the render
    /// invocation fails.
    pub async fn graph(
        &self,
        template: &GraphTemplate,
        options: &RenderOptions,
        context: &SubstitutionContext,
        output_path: impl AsRef<Path>,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        ensure_parent_dir(output_path).await?;

        let argv = graph_args(output_path, template, options, context);
        let output = self.run(output_path, &argv).await?;
        if !output.success() {
            return Err(RrdError::command_failed(
                output_path,
                output.combined_lossy(),
                None,
            ));
        }

        info!(path = %output_path.display(), "rendered graph");
        Ok(())
    }

    /// Runs one engine invocation, surfacing launch failures with the
    /// target path attached.
    async fn run(&self, path: &Path, argv: &[String]) -> Result<CommandOutput> {
        RrdCommand::new(&self.config.binary)
            .args(argv)
            .execute()
            .await
            .map_err(|e| RrdError::command_failed(path, String::new(), Some(e)))
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}
