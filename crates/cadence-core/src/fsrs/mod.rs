//! FSRS-6 (Free Spaced Repetition Scheduler) Module
//!
//! Memory model plus the review state machine built on top of it.
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + FACTOR * t / S)^(-w20) where FACTOR = 0.9^(-1/w20) - 1
//! - Interval: t = S/FACTOR * (R^(-1/w20) - 1)
//! - Same-day reviews: S' = S * e^(w17 * (G - 3 + w18)) * S^(-w19)

mod algorithm;
mod fuzz;
mod parameters;
mod scheduler;

pub use algorithm::{next_interval, retrievability, Calculator, FsrsCalculator};

pub use fuzz::{fuzz_range, Fuzzer, NoFuzz, RandomFuzzer, MIN_FUZZ_DAYS};

pub use parameters::{
    Parameters,
    DEFAULT_DECAY,
    DEFAULT_MAXIMUM_INTERVAL,
    DEFAULT_RETENTION,
    // Constants
    FSRS6_WEIGHTS,
    LOWER_BOUNDS,
    MAX_DIFFICULTY,
    MAX_STABILITY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
    PARAMETER_COUNT,
    UPPER_BOUNDS,
};

pub use scheduler::{PreviewResults, ReviewResult, Scheduler, SchedulerConfig};
