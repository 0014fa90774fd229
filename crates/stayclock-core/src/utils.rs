//! Utility helpers — path resolution and timestamp formatting.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Get the Stayclock data directory (e.g. `~/.stayclock/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".stayclock")
}

/// Turn a UTC offset in minutes into a `FixedOffset`.
///
/// Offsets outside ±24h fall back to UTC.
pub fn fixed_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in the given offset.
pub fn format_timestamp(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_in_jst() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 5).unwrap();
        assert_eq!(format_timestamp(ts, fixed_offset(540)), "2024-02-01 08:30:05");
    }

    #[test]
    fn test_format_timestamp_in_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 5).unwrap();
        assert_eq!(format_timestamp(ts, fixed_offset(0)), "2024-01-31 23:30:05");
    }

    #[test]
    fn test_out_of_range_offset_is_utc() {
        assert_eq!(fixed_offset(100_000).local_minus_utc(), 0);
        assert_eq!(fixed_offset(-60).local_minus_utc(), -3600);
    }

    #[test]
    fn test_data_path_ends_with_stayclock() {
        let path = get_data_path();
        assert!(path.ends_with(".stayclock"));
    }
}
