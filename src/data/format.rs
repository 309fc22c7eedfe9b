//! Display formatting for sizes, counts, rates and uptimes.

/// Binary units, largest first.
const BYTE_UNITS: &[(&str, f64)] = &[
    ("TB", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("GB", 1024.0 * 1024.0 * 1024.0),
    ("MB", 1024.0 * 1024.0),
    ("KB", 1024.0),
];

/// Format a byte count, e.g. `1.5MB` or `512B`.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0B".to_string();
    }
    for (suffix, size) in BYTE_UNITS {
        if bytes >= *size {
            return format!("{:.1}{}", bytes / size, suffix);
        }
    }
    format!("{}B", bytes as u64)
}

/// Format a count with K/M suffixes.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a per-second rate.
pub fn format_rate(per_sec: f64) -> String {
    if !per_sec.is_finite() || per_sec <= 0.0 {
        "0/s".to_string()
    } else if per_sec < 10.0 {
        format!("{per_sec:.1}/s")
    } else {
        format!("{}/s", format_count(per_sec.round() as u64))
    }
}

/// Format a byte rate, e.g. `2.0MB/s`.
pub fn format_byte_rate(per_sec: f64) -> String {
    format!("{}/s", format_bytes(per_sec))
}

pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        "-".to_string()
    }
}

/// Format an uptime in seconds, keeping the two largest units.
pub fn format_uptime(seconds: i64) -> String {
    if seconds <= 0 {
        return "-".to_string();
    }
    let (d, h, m, s) = (
        seconds / 86_400,
        seconds % 86_400 / 3_600,
        seconds % 3_600 / 60,
        seconds % 60,
    );
    if d > 0 {
        format!("{d}d {h}h")
    } else if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0B");
        assert_eq!(format_bytes(512.0), "512B");
        assert_eq!(format_bytes(1536.0), "1.5KB");
        assert_eq!(format_bytes(6.8 * 1024.0 * 1024.0 * 1024.0), "6.8GB");
        assert_eq!(format_bytes(f64::NAN), "0B");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(2_500_000), "2.5M");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0/s");
        assert_eq!(format_rate(2.4), "2.4/s");
        assert_eq!(format_rate(12_400.0), "12.4K/s");
        assert_eq!(format_byte_rate(2048.0), "2.0KB/s");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "-");
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(3_725), "1h 2m");
        assert_eq!(format_uptime(90_000), "1d 1h");
    }
}
