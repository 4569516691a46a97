//! Local-time calendar helpers: target-year bounds, submission stamps,
//! and the holiday lookup set.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, TimeZone, Timelike};
use tracing::warn;

/// One year in seconds; durations beyond this are corrupted timestamps.
pub const ONE_YEAR_SECONDS: i64 = 31_536_000;

/// Submission clock values at or past this are not night-owl submissions.
pub const NIGHT_CUTOFF: &str = "060000";

/// Labels of the four six-hour submission windows, in snapshot order.
pub const TIME_PERIODS: [&str; 4] = ["1-6", "7-12", "13-18", "19-24"];

/// Inclusive epoch-second bounds of a calendar year in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub start: i64,
    pub end: i64,
}

impl YearBounds {
    /// Bounds for `year`: [Jan 1 00:00:00, Dec 31 23:59:59] local time.
    pub fn for_year(year: i32) -> Result<Self> {
        let start = Local
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .earliest()
            .with_context(|| format!("year {year} has no representable start instant"))?;
        let end = Local
            .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
            .earliest()
            .with_context(|| format!("year {year} has no representable end instant"))?;
        Ok(Self {
            start: start.timestamp(),
            end: end.timestamp(),
        })
    }

    /// Whether an epoch timestamp falls inside the year, inclusive.
    pub fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Calendar coordinates of one submission instant, derived once per
/// record and shared by every accumulator it folds into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitStamp {
    /// Zero-padded month-day, e.g. "0229".
    pub month_day: String,
    /// Zero-padded clock time, e.g. "013000". Fixed width, so string
    /// order equals numeric order.
    pub clock: String,
    /// Hour of day, 0-23.
    pub hour: u32,
}

/// Derive the local-time stamp for an epoch second.
///
/// `None` only for timestamps the local calendar cannot represent.
pub fn submit_stamp(ts: i64) -> Option<SubmitStamp> {
    let dt = Local.timestamp_opt(ts, 0).single()?;
    Some(SubmitStamp {
        month_day: format!("{:02}{:02}", dt.month(), dt.day()),
        clock: format!("{:02}{:02}{:02}", dt.hour(), dt.minute(), dt.second()),
        hour: dt.hour(),
    })
}

/// Six-hour window label for an hour of day. Windows are half-open:
/// "1-6" covers 00:00-05:59:59 and so on.
pub fn period_label(hour: u32) -> &'static str {
    match hour {
        0..=5 => TIME_PERIODS[0],
        6..=11 => TIME_PERIODS[1],
        12..=17 => TIME_PERIODS[2],
        _ => TIME_PERIODS[3],
    }
}

/// Load the holiday month-days for `year` from a holiday list file.
///
/// One entry per line: a four-digit year and a four-digit month-day,
/// whitespace separated. Entries for other years and malformed lines are
/// skipped. A missing file means no holidays, not an error.
pub fn load_holidays(path: &Path, year: i32) -> HashSet<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                file = %path.display(),
                %err,
                "holiday list unavailable, counting no holidays",
            );
            return HashSet::new();
        }
    };

    let year_token = year.to_string();
    let mut days = HashSet::new();
    for line in raw.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(entry_year), Some(month_day), None) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        if entry_year != year_token {
            continue;
        }
        if month_day.len() == 4 && month_day.bytes().all(|b| b.is_ascii_digit()) {
            days.insert(month_day.to_string());
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_bounds_inclusive() {
        let bounds = YearBounds::for_year(2023).expect("bounds");
        assert!(bounds.contains(bounds.start));
        assert!(bounds.contains(bounds.end));
        assert!(!bounds.contains(bounds.start - 1));
        assert!(!bounds.contains(bounds.end + 1));
        // Non-leap year: 365 days exactly.
        assert_eq!(bounds.end - bounds.start, 365 * 86_400 - 1);
    }

    #[test]
    fn test_leap_year_bounds() {
        let bounds = YearBounds::for_year(2024).expect("bounds");
        assert_eq!(bounds.end - bounds.start, 366 * 86_400 - 1);
    }

    #[test]
    fn test_submit_stamp_roundtrip() {
        let ts = Local
            .with_ymd_and_hms(2023, 3, 7, 1, 30, 59)
            .single()
            .expect("local instant")
            .timestamp();
        let stamp = submit_stamp(ts).expect("stamp");
        assert_eq!(stamp.month_day, "0307");
        assert_eq!(stamp.clock, "013059");
        assert_eq!(stamp.hour, 1);
    }

    #[test]
    fn test_period_labels_half_open() {
        assert_eq!(period_label(0), "1-6");
        assert_eq!(period_label(5), "1-6");
        assert_eq!(period_label(6), "7-12");
        assert_eq!(period_label(11), "7-12");
        assert_eq!(period_label(12), "13-18");
        assert_eq!(period_label(17), "13-18");
        assert_eq!(period_label(18), "19-24");
        assert_eq!(period_label(23), "19-24");
    }

    #[test]
    fn test_clock_string_order_is_numeric_order() {
        assert!("013000" < NIGHT_CUTOFF);
        assert!("060000" >= NIGHT_CUTOFF);
        assert!("235959" > "013000");
    }

    #[test]
    fn test_load_holidays_filters_year() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("holidays.txt");
        std::fs::write(
            &path,
            "2023 0101\n2023 0501\n2022 1001\nmalformed\n2023 10x1\n2023 0101 extra\n",
        )
        .expect("write holidays");

        let days = load_holidays(&path, 2023);
        assert_eq!(days.len(), 2);
        assert!(days.contains("0101"));
        assert!(days.contains("0501"));
        assert!(!days.contains("1001"));
    }

    #[test]
    fn test_missing_holiday_file_is_empty() {
        let days = load_holidays(Path::new("/nonexistent/holidays.txt"), 2023);
        assert!(days.is_empty());
    }
}
