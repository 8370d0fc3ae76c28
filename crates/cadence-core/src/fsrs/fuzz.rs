//! Interval fuzzing
//!
//! Cards reviewed together on the same day would otherwise keep coming back
//! together. A small random spread on Review intervals breaks those clusters
//! apart. The spread grows with the interval in three bands.

use std::sync::Mutex;

use chrono::Duration;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Intervals shorter than this many days are never fuzzed
pub const MIN_FUZZ_DAYS: f64 = 2.5;

/// `(start, end, factor)`: each band adds `factor` days of spread per day
/// of interval falling inside it
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.1),
    (20.0, f64::INFINITY, 0.05),
];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Closed integer day range a fuzzed interval is drawn from.
///
/// `None` when the interval is too short to fuzz.
pub fn fuzz_range(days: f64, maximum_interval: u32) -> Option<(u32, u32)> {
    if days < MIN_FUZZ_DAYS {
        return None;
    }

    let delta = FUZZ_RANGES
        .iter()
        .fold(1.0, |acc, &(start, end, factor)| {
            acc + factor * (days.min(end) - start).max(0.0)
        });

    let max_ivl = (days + delta).round().min(f64::from(maximum_interval));
    let min_ivl = (days - delta).round().max(2.0).min(max_ivl);
    Some((min_ivl as u32, max_ivl as u32))
}

fn as_days(interval: Duration) -> f64 {
    interval.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Perturbs a computed Review interval
pub trait Fuzzer: Send + Sync {
    fn apply_fuzz(&self, interval: Duration, maximum_interval: u32) -> Duration;
}

/// Uniform draw over [`fuzz_range`] from a seedable ChaCha8 stream.
///
/// The generator sits behind a mutex so one fuzzer can serve a scheduler
/// shared across threads.
pub struct RandomFuzzer {
    rng: Mutex<ChaCha8Rng>,
}

impl Default for RandomFuzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomFuzzer {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Create with a fixed seed (for testing and replay)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl std::fmt::Debug for RandomFuzzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomFuzzer").finish_non_exhaustive()
    }
}

impl Fuzzer for RandomFuzzer {
    fn apply_fuzz(&self, interval: Duration, maximum_interval: u32) -> Duration {
        let Some((min_ivl, max_ivl)) = fuzz_range(as_days(interval), maximum_interval) else {
            return interval;
        };

        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let fuzzed = rng.gen_range(min_ivl..=max_ivl).min(maximum_interval);
        Duration::days(i64::from(fuzzed))
    }
}

/// Identity fuzzer, for deterministic scheduling
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFuzz;

impl Fuzzer for NoFuzz {
    fn apply_fuzz(&self, interval: Duration, _maximum_interval: u32) -> Duration {
        interval
    }
}
