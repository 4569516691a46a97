use std::collections::HashSet;

use indexmap::IndexMap;

use crate::acct::record::JobRecord;
use crate::calendar::{period_label, SubmitStamp, NIGHT_CUTOFF, TIME_PERIODS};

/// Mutable per-user aggregate, folded once per job record.
///
/// One accumulator exists per user plus a synthetic `"all"` entry that
/// every record also folds into, so for any metric
/// `all == sum (or max) over users`. Histograms are insertion-ordered:
/// first-encounter order decides ties downstream, so it must survive
/// the fold.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAcc {
    pub jobs_count: u64,
    pub runtime_sum: i64,
    pub cpu_time_sum: f64,
    /// Submissions per month-day ("MMDD").
    pub date_histogram: IndexMap<String, u64>,
    pub queue_histogram: IndexMap<String, u64>,
    pub software_histogram: IndexMap<String, u64>,
    /// Submissions per six-hour window, fixed keys.
    pub time_period: IndexMap<String, u64>,
    /// Latest pre-06:00 submission clock ("HHMMSS").
    pub latest_clock: String,
    /// Month-day of that submission.
    pub latest_clock_date: String,
    pub biggest_runtime: i64,
    pub biggest_cpu_time: f64,
    pub biggest_wait_time: i64,
    pub holiday_count: u64,
    // Raw samples, consumed by the finalizer and never persisted.
    pub(crate) runtime_samples: Vec<i64>,
    pub(crate) wait_samples: Vec<i64>,
    pub(crate) efficiency_samples: Vec<f64>,
}

impl UserAcc {
    /// Creates an empty accumulator with the time-period keys seeded in
    /// snapshot order.
    pub fn new() -> Self {
        let mut time_period = IndexMap::with_capacity(TIME_PERIODS.len());
        for label in TIME_PERIODS {
            time_period.insert(label.to_string(), 0);
        }
        Self {
            jobs_count: 0,
            runtime_sum: 0,
            cpu_time_sum: 0.0,
            date_histogram: IndexMap::new(),
            queue_histogram: IndexMap::new(),
            software_histogram: IndexMap::new(),
            time_period,
            latest_clock: "000000".to_string(),
            latest_clock_date: "0101".to_string(),
            biggest_runtime: 0,
            biggest_cpu_time: 0.0,
            biggest_wait_time: 0,
            holiday_count: 0,
            runtime_samples: Vec::new(),
            wait_samples: Vec::new(),
            efficiency_samples: Vec::new(),
        }
    }

    /// Fold one record into the aggregate.
    ///
    /// `stamp` is the record's submission stamp, derived once by the
    /// reduce phase and shared with the `"all"` accumulator.
    pub fn fold(&mut self, rec: &JobRecord, stamp: &SubmitStamp, holidays: &HashSet<String>) {
        self.jobs_count += 1;
        self.runtime_sum += rec.run_seconds;
        self.cpu_time_sum += rec.cpu_seconds;

        *self
            .date_histogram
            .entry(stamp.month_day.clone())
            .or_insert(0) += 1;
        *self.queue_histogram.entry(rec.queue.clone()).or_insert(0) += 1;
        *self
            .software_histogram
            .entry(rec.software.clone())
            .or_insert(0) += 1;
        if let Some(slot) = self.time_period.get_mut(period_label(stamp.hour)) {
            *slot += 1;
        }

        // Night-owl clock: only submissions strictly before 06:00 count,
        // and only a strictly later clock displaces the stored one.
        if stamp.clock.as_str() < NIGHT_CUTOFF && stamp.clock > self.latest_clock {
            self.latest_clock = stamp.clock.clone();
            self.latest_clock_date = stamp.month_day.clone();
        }

        self.biggest_runtime = self.biggest_runtime.max(rec.run_seconds);
        self.biggest_cpu_time = self.biggest_cpu_time.max(rec.cpu_seconds);
        self.biggest_wait_time = self.biggest_wait_time.max(rec.wait_seconds);

        if holidays.contains(&stamp.month_day) {
            self.holiday_count += 1;
        }

        self.runtime_samples.push(rec.run_seconds);
        self.wait_samples.push(rec.wait_seconds);
        self.efficiency_samples.push(rec.efficiency());
    }
}

impl Default for UserAcc {
    fn default() -> Self {
        Self::new()
    }
}
