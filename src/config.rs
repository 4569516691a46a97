use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Result};

/// Default upper bound on parallel file workers.
pub const DEFAULT_WORKER_LIMIT: usize = 8;

/// Validated settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the accounting log files.
    pub log_dir: PathBuf,
    /// Calendar year to aggregate.
    pub year: i32,
    /// User-requested ceiling on worker threads.
    pub worker_limit: usize,
    /// Holiday list file; missing is tolerated.
    pub holiday_file: PathBuf,
    /// Directory the year snapshot is written to.
    pub out_dir: PathBuf,
}

impl Settings {
    /// Validate the raw CLI values.
    pub fn new(
        log_dir: PathBuf,
        year: i32,
        worker_limit: usize,
        holiday_file: PathBuf,
        out_dir: PathBuf,
    ) -> Result<Self> {
        if worker_limit == 0 {
            bail!("worker limit must be > 0");
        }
        if !log_dir.is_dir() {
            bail!("log directory {} does not exist", log_dir.display());
        }
        Ok(Self {
            log_dir,
            year,
            worker_limit,
            holiday_file,
            out_dir,
        })
    }

    /// Effective worker count for `files` discovered log files:
    /// bounded by the requested limit, the file count, and the available
    /// parallelism, floored at 1.
    pub fn worker_count(&self, files: usize) -> usize {
        let cpus = thread::available_parallelism().map_or(1, |n| n.get());
        self.worker_limit.min(files).min(cpus).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(worker_limit: usize) -> Settings {
        Settings {
            log_dir: PathBuf::from("."),
            year: 2023,
            worker_limit,
            holiday_file: PathBuf::from("holidays.txt"),
            out_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_worker_count_bounded_by_files() {
        assert!(settings(8).worker_count(3) <= 3);
    }

    #[test]
    fn test_worker_count_bounded_by_limit() {
        assert!(settings(2).worker_count(100) <= 2);
    }

    #[test]
    fn test_worker_count_floored_at_one() {
        assert_eq!(settings(8).worker_count(0), 1);
    }

    #[test]
    fn test_new_rejects_zero_workers() {
        let result = Settings::new(
            PathBuf::from("."),
            2023,
            0,
            PathBuf::from("holidays.txt"),
            PathBuf::from("."),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_missing_log_dir() {
        let result = Settings::new(
            PathBuf::from("/nonexistent/logs"),
            2023,
            8,
            PathBuf::from("holidays.txt"),
            PathBuf::from("."),
        );
        assert!(result.is_err());
    }
}
