//! Map-reduce driver: fan file scans out across a bounded worker pool,
//! then fold every record sequentially into the accumulator map.
//!
//! Workers are pure functions of (path, year bounds) and share nothing
//! mutable; results are collected completely before the reduce phase
//! starts, and the reduce itself is single-threaded in discovered-file
//! order so every first-encounter tie-break is deterministic.

pub mod worker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{error, info};

use crate::acct::record::JobRecord;
use crate::acct::ACCT_FILE_TAG;
use crate::calendar::{load_holidays, submit_stamp, YearBounds};
use crate::config::Settings;
use crate::snapshot;
use crate::stats::accumulator::UserAcc;
use crate::stats::finalize::finalize;

/// Key of the synthetic accumulator covering every user.
pub const ALL_USERS: &str = "all";

/// What a finished run looked like, for the operator summary.
#[derive(Debug)]
pub struct RunSummary {
    pub files: usize,
    pub records: usize,
    pub users: usize,
    pub snapshot_path: PathBuf,
    pub elapsed: Duration,
}

/// Run the whole pipeline: discover, map, reduce, finalize, persist.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let started = Instant::now();

    let bounds = YearBounds::for_year(settings.year)?;
    let files = discover_files(&settings.log_dir)?;
    let holidays = load_holidays(&settings.holiday_file, settings.year);
    let workers = settings.worker_count(files.len());

    info!(
        files = files.len(),
        workers,
        year = settings.year,
        "starting ingestion",
    );

    let per_file = map_files(&files, &bounds, workers);
    let records: usize = per_file.iter().map(Vec::len).sum();

    let accumulators = reduce(per_file, &holidays);
    let users = accumulators.len().saturating_sub(1);

    let mut reports = IndexMap::with_capacity(accumulators.len());
    for (user, acc) in accumulators {
        reports.insert(user, finalize(acc));
    }

    let snapshot_path = snapshot::write(&settings.out_dir, settings.year, &reports)?;

    let summary = RunSummary {
        files: files.len(),
        records,
        users,
        snapshot_path,
        elapsed: started.elapsed(),
    };

    info!(
        files = summary.files,
        records = summary.records,
        users = summary.users,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        snapshot = %summary.snapshot_path.display(),
        "ingestion finished",
    );

    Ok(summary)
}

/// List the accounting files in a directory, sorted by path.
///
/// Non-recursive; only regular files whose name contains the accounting
/// tag are kept. The sort pins reduce order, which tie-breaks depend on.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing log directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let name = entry.file_name();
        if path.is_file() && name.to_string_lossy().contains(ACCT_FILE_TAG) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Map phase: scan every file across `workers` threads.
///
/// Results come back keyed by file index so the output vector preserves
/// discovery order regardless of completion order. A file that cannot be
/// read is logged and contributes an empty slot.
fn map_files(files: &[PathBuf], bounds: &YearBounds, workers: usize) -> Vec<Vec<JobRecord>> {
    let mut slots: Vec<Vec<JobRecord>> = Vec::new();
    slots.resize_with(files.len(), Vec::new);

    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Vec<JobRecord>)>();

    thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            s.spawn(move || loop {
                let idx = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(path) = files.get(idx) else { break };
                let records = match worker::scan_file(path, bounds) {
                    Ok(records) => records,
                    Err(err) => {
                        error!(
                            file = %path.display(),
                            %err,
                            "failed to read log file, contributing no records",
                        );
                        Vec::new()
                    }
                };
                if tx.send((idx, records)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (idx, records) in rx {
            slots[idx] = records;
        }
    });

    slots
}

/// Reduce phase: fold every record into its user's accumulator and the
/// synthetic [`ALL_USERS`] entry, in file order.
fn reduce(
    per_file: Vec<Vec<JobRecord>>,
    holidays: &HashSet<String>,
) -> IndexMap<String, UserAcc> {
    let mut accumulators: IndexMap<String, UserAcc> = IndexMap::new();
    accumulators.insert(ALL_USERS.to_string(), UserAcc::new());

    for records in per_file {
        for rec in records {
            let Some(stamp) = submit_stamp(rec.submit_time) else {
                continue;
            };
            accumulators
                .entry(rec.user.clone())
                .or_default()
                .fold(&rec, &stamp, holidays);
            if let Some(all) = accumulators.get_mut(ALL_USERS) {
                all.fold(&rec, &stamp, holidays);
            }
        }
    }

    accumulators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, run: i64, wait: i64, cpu: f64) -> JobRecord {
        JobRecord {
            user: user.into(),
            queue: "normal".into(),
            submit_time: 1_672_600_000,
            cores: 1,
            software: "others".into(),
            wait_seconds: wait,
            run_seconds: run,
            cpu_seconds: cpu,
        }
    }

    #[test]
    fn test_reduce_sums_match_all_entry() {
        let per_file = vec![
            vec![record("alice", 100, 5, 50.0), record("bob", 200, 10, 60.0)],
            vec![record("alice", 300, 15, 70.0)],
        ];
        let accs = reduce(per_file, &HashSet::new());

        let all = &accs[ALL_USERS];
        let alice = &accs["alice"];
        let bob = &accs["bob"];

        assert_eq!(all.jobs_count, alice.jobs_count + bob.jobs_count);
        assert_eq!(all.runtime_sum, alice.runtime_sum + bob.runtime_sum);
        assert_eq!(all.cpu_time_sum, alice.cpu_time_sum + bob.cpu_time_sum);
        assert_eq!(all.biggest_runtime, 300);
        assert_eq!(all.biggest_wait_time, 15);
    }

    #[test]
    fn test_reduce_user_insertion_order() {
        let per_file = vec![
            vec![record("carol", 1, 0, 0.0)],
            vec![record("alice", 1, 0, 0.0), record("carol", 1, 0, 0.0)],
        ];
        let accs = reduce(per_file, &HashSet::new());

        let users: Vec<&String> = accs.keys().collect();
        assert_eq!(users, [ALL_USERS, "carol", "alice"]);
    }

    #[test]
    fn test_reduce_empty_input() {
        let accs = reduce(Vec::new(), &HashSet::new());
        assert_eq!(accs.len(), 1);
        assert_eq!(accs[ALL_USERS].jobs_count, 0);
    }

    #[test]
    fn test_discover_files_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["lsb.acct.2", "lsb.acct", "notes.txt", "lsb.acct.10"] {
            std::fs::write(dir.path().join(name), "").expect("touch");
        }
        std::fs::create_dir(dir.path().join("lsb.acct.dir")).expect("mkdir");

        let files = discover_files(dir.path()).expect("discover");
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["lsb.acct", "lsb.acct.10", "lsb.acct.2"]);
    }

    #[test]
    fn test_discover_files_missing_dir_errors() {
        assert!(discover_files(Path::new("/nonexistent/logs")).is_err());
    }

    #[test]
    fn test_map_files_preserves_file_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bounds = YearBounds {
            start: 1_672_500_000,
            end: 1_704_000_000,
        };

        // Two files with one valid record each, distinct users.
        let line = |user: &str| {
            format!(
                "JOB_FINISH \"10.108\" 1672600200 1001 502 33554434 4 1672600000 0 0 1672600100 \
                 \"{user}\" \"normal\" \"\" \"\" \"\" \"n1\" \"/home\" \"\" \"\" \"\" \"\" \
                 0 1 \"n1\" 0 \"\" \"j\" \"sleep 1\" 1.0 0.1\n"
            )
        };
        let a = dir.path().join("lsb.acct.1");
        let b = dir.path().join("lsb.acct.2");
        std::fs::write(&a, line("alice")).expect("write");
        std::fs::write(&b, line("bob")).expect("write");

        let files = vec![a, b];
        let slots = map_files(&files, &bounds, 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0][0].user, "alice");
        assert_eq!(slots[1][0].user, "bob");
    }

    #[test]
    fn test_map_files_unreadable_file_contributes_empty() {
        let bounds = YearBounds {
            start: 1_672_500_000,
            end: 1_704_000_000,
        };
        let files = vec![PathBuf::from("/nonexistent/lsb.acct.1")];
        let slots = map_files(&files, &bounds, 1);
        assert_eq!(slots.len(), 1);
        assert!(slots[0].is_empty());
    }
}
