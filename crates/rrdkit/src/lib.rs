//! Programmatic front end to the rrdtool round-robin time-series engine.
//!
//! rrdkit builds and issues `rrdtool` command invocations to create
//! databases, append data points, fetch historical ranges, and render
//! graphs, then parses the resulting text output back into typed values.
//! The storage engine itself (compression, consolidation math, pixel
//! rendering) stays behind the process boundary.
//!
//! # Features
//!
//! - Typed schema model with explicit unbounded fields ([`Scalar`])
//! - Bounded retry on the engine's write-lock contention during updates
//! - Best-effort fetch parsing that never loses column alignment
//! - Declarative graph templates with per-series placeholder expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use rrdkit::{
//!     Archive, Consolidation, Database, DataSource, DsKind, FetchOptions, RrdClient, Scalar,
//! };
//!
//! # async fn example() -> rrdkit::Result<()> {
//! let client = RrdClient::new();
//!
//! let db = Database::new(60)
//!     .data_source(DataSource::standard("in", DsKind::Gauge, 300, 0, Scalar::Unbounded))
//!     .archive(Archive::new(Consolidation::Average, 0.5, 1, 600));
//!
//! client.create("./net.rrd", &db).await?;
//! client.update("./net.rrd", 1, &[42.0]).await?;
//!
//! let series = client.fetch("./net.rrd", &FetchOptions::default()).await?;
//! for (timestamp, values) in series.iter() {
//!     println!("{timestamp}: {values:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod args;
pub mod client;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod schema;

pub use client::{ClientConfig, RrdClient};
pub use error::{Result, RrdError};
pub use fetch::{parse_fetch_output, FetchOptions, TimeSeries};
pub use graph::{
    DataElement, DataKind, GraphColor, GraphFont, GraphTemplate, RenderOptions, ScriptCommand,
    SubstitutionContext,
};
pub use schema::{Archive, Consolidation, Database, DataSource, DsKind, Scalar};
