//! Parsing of `fetch` output into typed time series.
//!
//! The engine prints a header line, a blank separator, then one row per
//! consolidated slot: `<timestamp>: <v0> <v1> ...`. Parsing is best-effort
//! per field: a value that does not parse becomes an unknown marker at its
//! position rather than aborting the row, so column alignment with the
//! requested data sources is never lost.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Range and resolution parameters for a fetch.
///
/// Unset fields fall back to the engine's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Start of the requested range.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// End of the requested range.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Requested archive resolution, normalized to whole seconds.
    #[serde(default)]
    pub resolution: Option<Duration>,
}

/// A fetched slice of history: aligned timestamps and value rows.
///
/// `rows[i]` holds the values reported at `timestamps[i]`, one `f64` per
/// data source in the engine's column order. Unknown samples are
/// [`f64::NAN`], never dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Row timestamps, in the engine's (ascending) output order.
    pub timestamps: Vec<DateTime<Utc>>,
    /// One slice of values per timestamp.
    pub rows: Vec<Vec<f64>>,
}

impl TimeSeries {
    /// Number of rows in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns `true` if the series holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Iterates `(timestamp, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, &[f64])> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }
}

/// Parses raw fetch output into a [`TimeSeries`].
///
/// The first two lines (column header and blank separator) are always
/// skipped, as are empty lines. Rows whose timestamp field does not parse
/// carry no position worth preserving and are skipped; value fields that do
/// not parse become [`f64::NAN`] at their position.
#[must_use]
pub fn parse_fetch_output(raw: &str) -> TimeSeries {
    let mut series = TimeSeries::default();

    for (index, line) in raw.lines().enumerate() {
        if index < 2 || line.is_empty() {
            continue;
        }

        let mut fields = line.split(' ');
        let Some(stamp_field) = fields.next() else {
            continue;
        };
        let stamp_field = stamp_field.strip_suffix(':').unwrap_or(stamp_field);
        let Ok(epoch) = stamp_field.parse::<i64>() else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(epoch, 0) else {
            continue;
        };

        let values: Vec<f64> = fields
            .map(|field| field.parse::<f64>().unwrap_or(f64::NAN))
            .collect();

        series.timestamps.push(timestamp);
        series.rows.push(values);
    }

    series
}
