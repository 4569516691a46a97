use serde::{Deserialize, Serialize};

/// Number of distribution buckets.
pub const NUM_BUCKETS: usize = 11;

/// Bucket boundaries in seconds.
/// 11 buckets: <10s, 10-30s, 30-60s, 1-10m, 10-30m, 30-60m, 1-4h,
/// 4-24h, 1-3d, 3-7d, 7d+.
const BOUNDARIES: [i64; 10] = [
    10,      // 10 seconds
    30,      // 30 seconds
    60,      // 1 minute
    600,     // 10 minutes
    1_800,   // 30 minutes
    3_600,   // 1 hour
    14_400,  // 4 hours
    86_400,  // 1 day
    259_200, // 3 days
    604_800, // 7 days
];

/// Fixed-bucket histogram for runtime and wait-time distributions.
///
/// A value equal to a boundary lands in the upper bucket: 10s is the
/// first value of 10-30s, and exactly 7 days is already 7d+.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationHistogram {
    buckets: [u64; NUM_BUCKETS],
}

impl DurationHistogram {
    /// Creates a new histogram with all buckets at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a histogram from a slice of duration samples.
    pub fn from_samples(samples: &[i64]) -> Self {
        let mut h = Self::new();
        for &s in samples {
            h.record(s);
        }
        h
    }

    /// Records a duration in seconds to the appropriate bucket.
    pub fn record(&mut self, seconds: i64) {
        self.buckets[bucket_index(seconds)] += 1;
    }

    /// Returns the current bucket counts.
    pub fn counts(&self) -> &[u64; NUM_BUCKETS] {
        &self.buckets
    }

    /// Sum of all bucket counts; equals the number of recorded samples.
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }
}

/// Returns the bucket index for a duration in seconds.
fn bucket_index(seconds: i64) -> usize {
    // Linear scan is fine for 10 boundaries.
    for (i, &boundary) in BOUNDARIES.iter().enumerate() {
        if seconds < boundary {
            return i;
        }
    }
    NUM_BUCKETS - 1 // 7d+ bucket
}
