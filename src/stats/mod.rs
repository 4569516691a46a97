//! Per-user aggregation: the fold-target accumulator, the fixed-bucket
//! duration histogram, and the finalization step that turns raw samples
//! into the persisted summary statistics.

pub mod accumulator;
pub mod finalize;
pub mod histogram;
