//! Schema model for round-robin databases.
//!
//! This module provides the typed definition handed to `create`:
//! - [`Database`]: ordered data sources and archives plus the base step
//! - [`DataSource`]: one named input channel
//! - [`Archive`]: one consolidated retention window
//! - [`Scalar`]: a tagged numeric value whose `Unbounded` variant replaces
//!   the engine's `U` sentinel
//!
//! All types are immutable value objects; nothing here performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RrdError};

/// A tagged numeric field value.
///
/// Engine fields like `min`/`max` accept integers, floats, or the literal
/// `U` meaning unbounded. Carrying the distinction explicitly removes any
/// ambiguity about how each stringifies and makes "no upper bound" a
/// variant instead of a magic zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// An integer value, serialized without a decimal point.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// No bound; serialized as the engine's `U` marker.
    Unbounded,
}

impl Scalar {
    /// Interprets a legacy `max` value, mapping the historical `0` sentinel
    /// to [`Scalar::Unbounded`].
    #[must_use]
    pub fn from_max(value: f64) -> Self {
        if value == 0.0 {
            Self::Unbounded
        } else {
            Self::Float(value)
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Unbounded => write!(f, "U"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// How the engine interprets raw samples for a standard data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DsKind {
    /// Instantaneous reading stored as-is.
    Gauge,
    /// Monotonically increasing counter; the engine stores the rate.
    Counter,
    /// Rate of change without the counter-wrap heuristics.
    Derive,
    /// Delta since the previous sample.
    Absolute,
}

impl DsKind {
    /// Engine spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "GAUGE",
            Self::Counter => "COUNTER",
            Self::Derive => "DERIVE",
            Self::Absolute => "ABSOLUTE",
        }
    }
}

impl std::fmt::Display for DsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named input channel in the schema.
///
/// COMPUTE sources carry a formula expression in place of
/// heartbeat/min/max; the two shapes are separate variants so the invariant
/// holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataSource {
    /// A sampled data source.
    Standard {
        /// Name, unique within its database.
        name: String,
        /// Sample interpretation.
        kind: DsKind,
        /// Maximum seconds between samples before the slot is unknown.
        heartbeat: u32,
        /// Lower bound on accepted values.
        min: Scalar,
        /// Upper bound on accepted values.
        max: Scalar,
    },
    /// A data source computed from others at consolidation time.
    Compute {
        /// Name, unique within its database.
        name: String,
        /// RPN formula evaluated by the engine.
        expression: String,
    },
}

impl DataSource {
    /// Creates a standard (sampled) data source.
    #[must_use]
    pub fn standard(
        name: impl Into<String>,
        kind: DsKind,
        heartbeat: u32,
        min: impl Into<Scalar>,
        max: impl Into<Scalar>,
    ) -> Self {
        Self::Standard {
            name: name.into(),
            kind,
            heartbeat,
            min: min.into(),
            max: max.into(),
        }
    }

    /// Creates a COMPUTE data source from an RPN expression.
    #[must_use]
    pub fn compute(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Compute {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// Returns the data-source name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Standard { name, .. } | Self::Compute { name, .. } => name,
        }
    }
}

/// Consolidation function applied when compressing primary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consolidation {
    /// Mean of the window.
    Average,
    /// Minimum of the window.
    Min,
    /// Maximum of the window.
    Max,
    /// Last primary point in the window.
    Last,
}

impl Consolidation {
    /// Engine spelling of this function.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "AVERAGE",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Last => "LAST",
        }
    }
}

impl std::fmt::Display for Consolidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consolidated, fixed-size retention window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    /// Consolidation function.
    pub cf: Consolidation,
    /// Fraction in `[0, 1)` of unknown primary points tolerated before an
    /// archive point is itself unknown.
    pub xff: f64,
    /// Primary data points per archive point.
    pub steps: u32,
    /// Number of archive points retained.
    pub rows: u32,
}

impl Archive {
    /// Creates a new archive definition.
    #[must_use]
    pub fn new(cf: Consolidation, xff: f64, steps: u32, rows: u32) -> Self {
        Self {
            cf,
            xff,
            steps,
            rows,
        }
    }
}

/// A round-robin database definition.
///
/// Data sources and archives keep their declared order; the engine derives
/// column order in fetch output and `DS:`/`RRA:` fragment order in create
/// arguments from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Seconds between expected samples.
    pub step: u32,
    /// Optional creation start timestamp.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Ordered data-source definitions.
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    /// Ordered archive definitions.
    #[serde(default)]
    pub archives: Vec<Archive>,
}

impl Database {
    /// Creates an empty database definition with the given step.
    #[must_use]
    pub fn new(step: u32) -> Self {
        Self {
            step,
            start: None,
            data_sources: Vec::new(),
            archives: Vec::new(),
        }
    }

    /// Sets the creation start timestamp.
    #[must_use]
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Appends a data source.
    #[must_use]
    pub fn data_source(mut self, ds: DataSource) -> Self {
        self.data_sources.push(ds);
        self
    }

    /// Appends an archive.
    #[must_use]
    pub fn archive(mut self, archive: Archive) -> Self {
        self.archives.push(archive);
        self
    }

    /// Checks the schema invariants.
    ///
    /// # Errors
    ///
    /// Returns `RrdError::InvalidSchema` if a data-source name repeats, the
    /// archive list is empty, or an archive's `xff` is outside `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for ds in &self.data_sources {
            if !seen.insert(ds.name()) {
                return Err(RrdError::invalid_schema(format!(
                    "duplicate data source name '{}'",
                    ds.name()
                )));
            }
        }

        if self.archives.is_empty() {
            return Err(RrdError::invalid_schema(
                "database requires at least one archive",
            ));
        }

        for archive in &self.archives {
            if !(0.0..1.0).contains(&archive.xff) {
                return Err(RrdError::invalid_schema(format!(
                    "archive xff {} outside [0, 1)",
                    archive.xff
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Scalar::Int(300), "300")]
    #[test_case(Scalar::Int(-5), "-5")]
    #[test_case(Scalar::Float(0.5), "0.5")]
    #[test_case(Scalar::Float(100.0), "100")]
    #[test_case(Scalar::Unbounded, "U")]
    fn test_scalar_display(scalar: Scalar, expected: &str) {
        assert_eq!(scalar.to_string(), expected);
    }

    #[test]
    fn test_scalar_from_max_zero_is_unbounded() {
        assert_eq!(Scalar::from_max(0.0), Scalar::Unbounded);
        assert_eq!(Scalar::from_max(100.0), Scalar::Float(100.0));
    }

    #[test]
    fn test_kind_spellings() {
        assert_eq!(DsKind::Gauge.as_str(), "GAUGE");
        assert_eq!(DsKind::Counter.as_str(), "COUNTER");
        assert_eq!(DsKind::Derive.as_str(), "DERIVE");
        assert_eq!(DsKind::Absolute.as_str(), "ABSOLUTE");
        assert_eq!(Consolidation::Average.as_str(), "AVERAGE");
        assert_eq!(Consolidation::Last.as_str(), "LAST");
    }

    #[test]
    fn test_data_source_name() {
        let gauge = DataSource::standard("in", DsKind::Gauge, 300, 0, Scalar::Unbounded);
        let computed = DataSource::compute("total", "in,out,+");
        assert_eq!(gauge.name(), "in");
        assert_eq!(computed.name(), "total");
    }

    #[test]
    fn test_validate_ok() {
        let db = Database::new(60)
            .data_source(DataSource::standard(
                "in",
                DsKind::Gauge,
                300,
                0,
                Scalar::Unbounded,
            ))
            .archive(Archive::new(Consolidation::Average, 0.5, 1, 600));
        assert!(db.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_name() {
        let db = Database::new(60)
            .data_source(DataSource::standard("in", DsKind::Gauge, 300, 0, 100))
            .data_source(DataSource::compute("in", "in,1,+"))
            .archive(Archive::new(Consolidation::Average, 0.5, 1, 600));
        let err = db.validate().expect_err("duplicate name should fail");
        assert!(err.to_string().contains("duplicate data source name 'in'"));
    }

    #[test]
    fn test_validate_empty_archives() {
        let db = Database::new(60).data_source(DataSource::standard(
            "in",
            DsKind::Gauge,
            300,
            0,
            100,
        ));
        assert!(db.validate().is_err());
    }

    #[test_case(1.0; "one")]
    #[test_case(1.5; "above one")]
    #[test_case(-0.1; "negative")]
    fn test_validate_bad_xff(xff: f64) {
        let db = Database::new(60)
            .data_source(DataSource::standard("in", DsKind::Gauge, 300, 0, 100))
            .archive(Archive::new(Consolidation::Average, xff, 1, 600));
        assert!(db.validate().is_err());
    }

    #[test]
    fn test_database_serialization_round_trip() {
        let db = Database::new(60)
            .data_source(DataSource::compute("total", "in,out,+"))
            .archive(Archive::new(Consolidation::Max, 0.5, 6, 700));

        let json = serde_json::to_string(&db).expect("serialize");
        let parsed: Database = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, db);
    }
}
