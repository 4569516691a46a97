//! Finalization: converts a raw accumulator into the summary record the
//! snapshot persists. Pure, per-accumulator, and tolerant of zero jobs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::accumulator::UserAcc;
use super::histogram::DurationHistogram;

/// Finalized per-user (or `"all"`) statistics as persisted in the year
/// snapshot. Raw sample lists never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub jobs_count: u64,
    pub runtime_sum: i64,
    pub cpu_time_sum: f64,
    pub date_histogram: IndexMap<String, u64>,
    pub queue_histogram: IndexMap<String, u64>,
    pub software_histogram: IndexMap<String, u64>,
    pub time_period: IndexMap<String, u64>,
    pub latest_clock: String,
    pub latest_clock_date: String,
    pub biggest_runtime: i64,
    pub biggest_cpu_time: f64,
    pub biggest_wait_time: i64,
    pub holiday_count: u64,
    pub mean_runtime: i64,
    pub median_runtime: f64,
    pub mean_waittime: i64,
    pub median_waittime: f64,
    /// Mean per-job CPU efficiency in percent, two decimals.
    pub mean_efficiency: f64,
    /// Month-day with the most submissions, first encountered on ties.
    pub most_freq_date: String,
    /// Month-day with the fewest submissions, first encountered on ties.
    pub least_freq_date: String,
    pub dist_runtime: DurationHistogram,
    pub dist_wait: DurationHistogram,
}

/// Freeze an accumulator: derive the summary statistics and drop the
/// sample lists. Zero-job accumulators finalize to zero/empty fields.
pub fn finalize(acc: UserAcc) -> UserReport {
    let mean_runtime = mean_rounded(&acc.runtime_samples);
    let median_runtime = median(&acc.runtime_samples);
    let mean_waittime = mean_rounded(&acc.wait_samples);
    let median_waittime = median(&acc.wait_samples);
    let mean_efficiency = mean_two_decimals(&acc.efficiency_samples);
    let (most_freq_date, least_freq_date) = frequency_extremes(&acc.date_histogram);
    let dist_runtime = DurationHistogram::from_samples(&acc.runtime_samples);
    let dist_wait = DurationHistogram::from_samples(&acc.wait_samples);

    UserReport {
        jobs_count: acc.jobs_count,
        runtime_sum: acc.runtime_sum,
        cpu_time_sum: acc.cpu_time_sum,
        date_histogram: acc.date_histogram,
        queue_histogram: acc.queue_histogram,
        software_histogram: acc.software_histogram,
        time_period: acc.time_period,
        latest_clock: acc.latest_clock,
        latest_clock_date: acc.latest_clock_date,
        biggest_runtime: acc.biggest_runtime,
        biggest_cpu_time: acc.biggest_cpu_time,
        biggest_wait_time: acc.biggest_wait_time,
        holiday_count: acc.holiday_count,
        mean_runtime,
        median_runtime,
        mean_waittime,
        median_waittime,
        mean_efficiency,
        most_freq_date,
        least_freq_date,
        dist_runtime,
        dist_wait,
    }
}

/// Arithmetic mean rounded to the nearest integer; 0 for no samples.
fn mean_rounded(samples: &[i64]) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: i64 = samples.iter().sum();
    (sum as f64 / samples.len() as f64).round() as i64
}

/// Mean rounded to two decimals; 0 for no samples.
fn mean_two_decimals(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    (mean * 100.0).round() / 100.0
}

/// Exact median: the mean of the two middle values for even lengths;
/// 0 for no samples.
fn median(samples: &[i64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Most- and least-frequent keys of a histogram, ties broken by the
/// earliest-encountered key. Empty strings for an empty histogram.
fn frequency_extremes(histogram: &IndexMap<String, u64>) -> (String, String) {
    let mut most: Option<(&str, u64)> = None;
    let mut least: Option<(&str, u64)> = None;
    for (key, &count) in histogram {
        if most.map_or(true, |(_, best)| count > best) {
            most = Some((key, count));
        }
        if least.map_or(true, |(_, best)| count < best) {
            least = Some((key, count));
        }
    }
    (
        most.map(|(k, _)| k.to_string()).unwrap_or_default(),
        least.map(|(k, _)| k.to_string()).unwrap_or_default(),
    )
}
