//! Derived metrics computed from raw telemetry.
//!
//! Both functions here are total: malformed or missing input yields `0.0`.
//! They feed display values only, so a bad field degrades to zero instead of
//! failing the snapshot it belongs to.

use std::sync::OnceLock;

use regex::Regex;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn human_size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)([KMG]?)").expect("static pattern"))
}

/// Parse a compact size string such as `"6.8GB"` or `"120M"` into bytes.
///
/// The first `<digits>[.<digits>]` run in the input is taken as the
/// magnitude, and a `K`, `M` or `G` directly after it selects a binary
/// multiplier (1024, 1024², 1024³). Suffixes are case-sensitive; anything
/// else leaves the multiplier at 1.
///
/// Returns `0.0` when no magnitude is present.
///
/// ```
/// use dbwatch_types::parse_human_size;
///
/// assert_eq!(parse_human_size("10K"), 10240.0);
/// assert_eq!(parse_human_size("abc"), 0.0);
/// ```
pub fn parse_human_size(text: &str) -> f64 {
    let Some(caps) = human_size_pattern().captures(text) else {
        return 0.0;
    };

    let value: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);

    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("K") => KIB,
        Some("M") => MIB,
        Some("G") => GIB,
        _ => 1.0,
    };

    value * multiplier
}

/// Byte distance between a primary's write offset and a replica's applied offset.
///
/// Returns `master - replica`, clamped at zero: a replica reporting an offset
/// ahead of its primary is a reporting artifact, not negative lag. Missing or
/// NaN inputs yield `0.0`. Offsets above 2^53 lose precision as `f64`.
///
/// ```
/// use dbwatch_types::calculate_replication_lag;
///
/// assert_eq!(calculate_replication_lag(Some(900.0), Some(400.0)), 500.0);
/// assert_eq!(calculate_replication_lag(None, Some(100.0)), 0.0);
/// ```
pub fn calculate_replication_lag(master_offset: Option<f64>, replica_offset: Option<f64>) -> f64 {
    match (master_offset, replica_offset) {
        (Some(master), Some(replica)) if !master.is_nan() && !replica.is_nan() => {
            (master - replica).max(0.0)
        }
        _ => 0.0,
    }
}
