//! Record parsing for raw accounting log lines.
//!
//! One line in, one [`JobRecord`] out — or a typed [`Reject`] naming why
//! the line was skipped. Rejection is the normal case for most of a log
//! file (non-finish events, other years, corrupted rows); callers treat
//! every variant as "skip this line" and nothing here panics or aborts a
//! file.

use thiserror::Error;

use super::classify::classify;
use super::extract::extract_tail;
use super::record::JobRecord;
use super::FINISH_MARKER;
use crate::calendar::{YearBounds, ONE_YEAR_SECONDS};

/// Fewest whitespace tokens a finish event can have.
const MIN_FIELDS: usize = 15;

// Positional fields of a finish event, 0-indexed after whitespace
// tokenization. The layout up to the queue column is stable across the
// format versions we ingest; the token at IDX_JOB_ID is part of it but
// unused here.
const IDX_END_TIME: usize = 2;
const IDX_CORES: usize = 6;
const IDX_SUBMIT_TIME: usize = 7;
const IDX_START_TIME: usize = 10;
const IDX_USER: usize = 11;
const IDX_QUEUE: usize = 12;

/// Why a line produced no record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Reject {
    #[error("not a finish event")]
    NotFinishEvent,

    #[error("line has {count} fields, need at least {MIN_FIELDS}")]
    TooShort { count: usize },

    #[error("field {name} is not an integer")]
    BadField { name: &'static str },

    #[error("job never started")]
    NeverStarted,

    #[error("submitted outside the target year")]
    OutsideYear,

    #[error("implausible run or wait duration")]
    CorruptDuration,

    #[error("no command/cpu tail recovered")]
    NoTail,
}

/// Parse one raw log line into a [`JobRecord`].
pub fn parse_line(line: &str, bounds: &YearBounds) -> Result<JobRecord, Reject> {
    if !line.contains(FINISH_MARKER) {
        return Err(Reject::NotFinishEvent);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_FIELDS {
        return Err(Reject::TooShort {
            count: tokens.len(),
        });
    }

    let end_time = int_field(&tokens, IDX_END_TIME, "end_time")?;
    let submit_time = int_field(&tokens, IDX_SUBMIT_TIME, "submit_time")?;
    let start_time = int_field(&tokens, IDX_START_TIME, "start_time")?;

    if start_time == 0 {
        return Err(Reject::NeverStarted);
    }
    if !bounds.contains(submit_time) {
        return Err(Reject::OutsideYear);
    }

    let run_seconds = end_time - start_time;
    let wait_seconds = start_time - submit_time;
    if !plausible(run_seconds) || !plausible(wait_seconds) {
        return Err(Reject::CorruptDuration);
    }

    // The core-count column moved across format versions; anything
    // unparseable degrades to a single core rather than a rejection.
    let cores = tokens
        .get(IDX_CORES)
        .and_then(|t| t.parse::<i64>().ok())
        .filter(|&c| c >= 1)
        .unwrap_or(1);

    let user = quoted(&tokens, IDX_USER);
    let queue = quoted(&tokens, IDX_QUEUE);

    let (_command, cpu_seconds) = extract_tail(line).ok_or(Reject::NoTail)?;
    let software = classify(&line.to_lowercase()).to_string();

    Ok(JobRecord {
        user,
        queue,
        submit_time,
        cores,
        software,
        wait_seconds,
        run_seconds,
        cpu_seconds,
    })
}

fn int_field(tokens: &[&str], idx: usize, name: &'static str) -> Result<i64, Reject> {
    tokens
        .get(idx)
        .and_then(|t| t.parse::<i64>().ok())
        .ok_or(Reject::BadField { name })
}

fn quoted(tokens: &[&str], idx: usize) -> String {
    tokens
        .get(idx)
        .map(|t| t.trim_matches('"'))
        .unwrap_or("")
        .to_string()
}

fn plausible(seconds: i64) -> bool {
    (0..=ONE_YEAR_SECONDS).contains(&seconds)
}
