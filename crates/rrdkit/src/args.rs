//! Pure argument construction for engine subcommands.
//!
//! Everything in this module is deterministic string assembly with no I/O;
//! the exact vectors are pinned by tests because the engine is sensitive to
//! both ordering and field spelling.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::fetch::FetchOptions;
use crate::schema::{Archive, Database, DataSource};

/// Rewrites a relative path to an explicit `./` form so the engine cannot
/// misread it as an option flag.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    if path.is_absolute() {
        path.display().to_string()
    } else {
        format!("./{}", path.display())
    }
}

fn ds_fragment(ds: &DataSource) -> String {
    match ds {
        DataSource::Standard {
            name,
            kind,
            heartbeat,
            min,
            max,
        } => format!("DS:{name}:{kind}:{heartbeat}:{min}:{max}"),
        DataSource::Compute { name, expression } => format!("DS:{name}:COMPUTE:{expression}"),
    }
}

fn rra_fragment(archive: &Archive) -> String {
    format!(
        "RRA:{}:{}:{}:{}",
        archive.cf, archive.xff, archive.steps, archive.rows
    )
}

/// Builds the full `create` argument vector for a database definition.
///
/// `--step` is always emitted; `--start` only when the definition carries
/// one. `DS:` fragments come before `RRA:` fragments, both in declared
/// order.
#[must_use]
pub fn create_args(path: &Path, db: &Database) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        path.display().to_string(),
        "--step".to_string(),
        db.step.to_string(),
    ];
    if let Some(start) = db.start {
        args.push("--start".to_string());
        args.push(start.timestamp().to_string());
    }
    args.extend(db.data_sources.iter().map(ds_fragment));
    args.extend(db.archives.iter().map(rra_fragment));
    args
}

/// Builds the colon-joined update sample string.
///
/// The timestamp field is `N` ("now", resolved by the engine) when no
/// instant is given. Exactly `slots` value fields follow: missing trailing
/// values pad with `U`, excess values are dropped, and non-finite values
/// serialize as `U`.
#[must_use]
pub fn update_sample(slots: usize, at: Option<DateTime<Utc>>, values: &[f64]) -> String {
    let timestamp = at.map_or_else(|| "N".to_string(), |t| t.timestamp().to_string());
    let mut fields = Vec::with_capacity(slots + 1);
    fields.push(timestamp);
    for slot in 0..slots {
        let field = match values.get(slot) {
            Some(v) if v.is_finite() => v.to_string(),
            _ => "U".to_string(),
        };
        fields.push(field);
    }
    fields.join(":")
}

/// Builds the full `update` argument vector.
#[must_use]
pub fn update_args(path: &Path, sample: &str) -> Vec<String> {
    vec![
        "update".to_string(),
        normalize_path(path),
        sample.to_string(),
    ]
}

/// Builds the full `fetch` argument vector.
///
/// Consolidation is always `AVERAGE`; unset range and resolution fields are
/// left to the engine's defaults. All temporal values normalize to whole
/// seconds.
#[must_use]
pub fn fetch_args(path: &Path, options: &FetchOptions) -> Vec<String> {
    let mut args = vec![
        "fetch".to_string(),
        path.display().to_string(),
        "AVERAGE".to_string(),
    ];
    if let Some(start) = options.start {
        args.push("--start".to_string());
        args.push(start.timestamp().to_string());
    }
    if let Some(end) = options.end {
        args.push("--end".to_string());
        args.push(end.timestamp().to_string());
    }
    if let Some(resolution) = options.resolution {
        args.push("--resolution".to_string());
        args.push(resolution.as_secs().to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::schema::{Consolidation, DsKind, Scalar};

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/var/rrd/net.rrd")), "/var/rrd/net.rrd");
        assert_eq!(normalize_path(Path::new("net.rrd")), "./net.rrd");
        assert_eq!(normalize_path(Path::new("data/net.rrd")), "./data/net.rrd");
    }

    #[test]
    fn test_create_args_gauge_unbounded() {
        let db = Database::new(60)
            .data_source(DataSource::standard(
                "x",
                DsKind::Gauge,
                300,
                0,
                Scalar::Unbounded,
            ))
            .archive(Archive::new(Consolidation::Average, 0.5, 1, 600));

        assert_eq!(
            create_args(Path::new("./x.rrd"), &db),
            vec![
                "create",
                "./x.rrd",
                "--step",
                "60",
                "DS:x:GAUGE:300:0:U",
                "RRA:AVERAGE:0.5:1:600",
            ]
        );
    }

    #[test]
    fn test_create_args_bounded_max_and_start() {
        let start = chrono::Utc.timestamp_opt(1_000_000_000, 0).single().expect("valid");
        let db = Database::new(300)
            .start(start)
            .data_source(DataSource::standard("rate", DsKind::Counter, 600, 0, 125_000_000))
            .data_source(DataSource::compute("total", "rate,8,*"))
            .archive(Archive::new(Consolidation::Average, 0.5, 1, 600))
            .archive(Archive::new(Consolidation::Max, 0.5, 6, 700));

        assert_eq!(
            create_args(Path::new("/var/rrd/net.rrd"), &db),
            vec![
                "create",
                "/var/rrd/net.rrd",
                "--step",
                "300",
                "--start",
                "1000000000",
                "DS:rate:COUNTER:600:0:125000000",
                "DS:total:COMPUTE:rate,8,*",
                "RRA:AVERAGE:0.5:1:600",
                "RRA:MAX:0.5:6:700",
            ]
        );
    }

    #[test]
    fn test_create_args_one_rra_per_archive() {
        let mut db = Database::new(60);
        for rows in [600, 700, 775] {
            db = db.archive(Archive::new(Consolidation::Average, 0.5, 1, rows));
        }
        let args = create_args(Path::new("./x.rrd"), &db);
        let rra: Vec<_> = args.iter().filter(|a| a.starts_with("RRA:")).collect();
        assert_eq!(rra.len(), 3);
        assert!(rra[2].ends_with(":775"));
    }

    #[test]
    fn test_update_sample_now() {
        assert_eq!(update_sample(2, None, &[1.5, 2.5]), "N:1.5:2.5");
    }

    #[test]
    fn test_update_sample_explicit_instant() {
        let at = chrono::Utc.timestamp_opt(1_000_000_000, 0).single().expect("valid");
        assert_eq!(update_sample(2, Some(at), &[1.0, 2.0]), "1000000000:1:2");
    }

    #[test]
    fn test_update_sample_pads_missing_with_unknown() {
        assert_eq!(update_sample(4, None, &[7.0]), "N:7:U:U:U");
    }

    #[test]
    fn test_update_sample_drops_excess() {
        assert_eq!(update_sample(1, None, &[1.0, 2.0, 3.0]), "N:1");
    }

    #[test]
    fn test_update_sample_non_finite_is_unknown() {
        assert_eq!(
            update_sample(3, None, &[f64::NAN, f64::INFINITY, 2.0]),
            "N:U:U:2"
        );
    }

    #[test]
    fn test_update_args_normalizes_relative_path() {
        assert_eq!(
            update_args(Path::new("net.rrd"), "N:1:2"),
            vec!["update", "./net.rrd", "N:1:2"]
        );
    }

    #[test]
    fn test_fetch_args_defaults() {
        assert_eq!(
            fetch_args(Path::new("./net.rrd"), &FetchOptions::default()),
            vec!["fetch", "./net.rrd", "AVERAGE"]
        );
    }

    #[test]
    fn test_fetch_args_full_range() {
        let start = chrono::Utc.timestamp_opt(1_000_000_000, 0).single().expect("valid");
        let end = chrono::Utc.timestamp_opt(1_000_086_400, 0).single().expect("valid");
        let options = FetchOptions {
            start: Some(start),
            end: Some(end),
            resolution: Some(Duration::from_secs(300)),
        };
        assert_eq!(
            fetch_args(Path::new("./net.rrd"), &options),
            vec![
                "fetch",
                "./net.rrd",
                "AVERAGE",
                "--start",
                "1000000000",
                "--end",
                "1000086400",
                "--resolution",
                "300",
            ]
        );
    }
}
