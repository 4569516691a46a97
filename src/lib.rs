//! Batch ingestion of LSF-style accounting logs into a per-user usage
//! snapshot.
//!
//! The pipeline tokenizes finish-event lines from `lsb.acct` files,
//! recovers the command and CPU-seconds figure from the free-text line
//! tail, classifies each job by the software it likely ran, and folds
//! everything into per-user accumulators plus a synthetic `"all"` entry.
//! The finalized map is persisted as one binary snapshot per calendar
//! year; report rendering is a separate consumer of that file.

pub mod acct;
pub mod calendar;
pub mod config;
pub mod pipeline;
pub mod snapshot;
pub mod stats;
