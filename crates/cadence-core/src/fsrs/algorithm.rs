//! FSRS-6 memory formulas
//!
//! Closed-form functions over (difficulty, stability, retrievability). The
//! [`Calculator`] trait is the seam the scheduler depends on, so tests can
//! swap in a double; [`FsrsCalculator`] is the real model.

use crate::fsrs::parameters::{MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_STABILITY, Parameters};
use crate::memory::Rating;

// ============================================================================
// FORGETTING CURVE
// ============================================================================

/// Probability of recall after `elapsed_days` under the power-law curve:
/// `R = (1 + factor * t / S) ^ decay`
#[inline]
pub fn retrievability(elapsed_days: f64, stability: f64, decay: f64, factor: f64) -> f64 {
    (1.0 + factor * elapsed_days / stability).powf(decay)
}

/// Invert the curve: days until retrievability falls to `retention`.
///
/// Rounded to whole days and clamped to `[1, maximum_interval]`.
pub fn next_interval(
    stability: f64,
    retention: f64,
    decay: f64,
    factor: f64,
    maximum_interval: u32,
) -> f64 {
    let interval = (stability / factor) * (retention.powf(1.0 / decay) - 1.0);
    interval.round().max(1.0).min(f64::from(maximum_interval))
}

#[inline]
fn clamp_difficulty(difficulty: f64) -> f64 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Floor only. The stability ceiling bounds weights, not inference.
#[inline]
fn clamp_stability(stability: f64) -> f64 {
    stability.max(MIN_STABILITY)
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Memory-state model used by the scheduler
pub trait Calculator: Send + Sync {
    /// Stability after the very first review
    fn initial_stability(&self, rating: Rating) -> f64;

    /// Difficulty after the very first review, in [1, 10]
    fn initial_difficulty(&self, rating: Rating) -> f64;

    fn retrievability(&self, elapsed_days: f64, stability: f64, decay: f64, factor: f64) -> f64;

    /// Interval in whole days for the target retention
    fn next_interval(
        &self,
        stability: f64,
        retention: f64,
        decay: f64,
        factor: f64,
        maximum_interval: u32,
    ) -> f64;

    fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64;

    /// Stability after a review at least a day after the previous one
    fn next_stability(
        &self,
        difficulty: f64,
        stability: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64;

    /// Stability after a same-day review
    fn short_term_stability(&self, stability: f64, rating: Rating) -> f64;
}

/// The FSRS-6 model over a validated parameter set
#[derive(Debug, Clone, Default)]
pub struct FsrsCalculator {
    parameters: Parameters,
}

impl FsrsCalculator {
    pub fn new(parameters: Parameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// `w4 - e^(w5 * (G - 1)) + 1`, unclamped. Mean reversion targets the
    /// raw Easy value, so the clamp must not be applied here.
    fn initial_difficulty_raw(&self, rating: Rating) -> f64 {
        let w = &self.parameters;
        w.w(4) - (w.w(5) * (rating.as_f64() - 1.0)).exp() + 1.0
    }

    fn next_forget_stability(&self, difficulty: f64, stability: f64, retrievability: f64) -> f64 {
        let w = &self.parameters;
        let long_term = w.w(11)
            * difficulty.powf(-w.w(12))
            * ((stability + 1.0).powf(w.w(13)) - 1.0)
            * ((1.0 - retrievability) * w.w(14)).exp();
        let short_term = stability / (w.w(17) * w.w(18)).exp();
        long_term.min(short_term)
    }

    fn next_recall_stability(
        &self,
        difficulty: f64,
        stability: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let w = &self.parameters;
        let hard_penalty = if rating == Rating::Hard { w.w(15) } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { w.w(16) } else { 1.0 };

        stability
            * (1.0
                + w.w(8).exp()
                    * (11.0 - difficulty)
                    * stability.powf(-w.w(9))
                    * (((1.0 - retrievability) * w.w(10)).exp() - 1.0)
                    * hard_penalty
                    * easy_bonus)
    }
}

impl Calculator for FsrsCalculator {
    fn initial_stability(&self, rating: Rating) -> f64 {
        clamp_stability(self.parameters.w(rating.value() as usize - 1))
    }

    fn initial_difficulty(&self, rating: Rating) -> f64 {
        clamp_difficulty(self.initial_difficulty_raw(rating))
    }

    fn retrievability(&self, elapsed_days: f64, stability: f64, decay: f64, factor: f64) -> f64 {
        retrievability(elapsed_days, stability, decay, factor)
    }

    fn next_interval(
        &self,
        stability: f64,
        retention: f64,
        decay: f64,
        factor: f64,
        maximum_interval: u32,
    ) -> f64 {
        next_interval(stability, retention, decay, factor, maximum_interval)
    }

    fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let w = &self.parameters;
        let delta = -w.w(6) * (rating.as_f64() - 3.0);
        let damped = difficulty + (10.0 - difficulty) * delta / 9.0;
        let reverted = w.w(7) * self.initial_difficulty_raw(Rating::Easy) + (1.0 - w.w(7)) * damped;
        clamp_difficulty(reverted)
    }

    fn next_stability(
        &self,
        difficulty: f64,
        stability: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let next = if rating.is_success() {
            self.next_recall_stability(difficulty, stability, retrievability, rating)
        } else {
            self.next_forget_stability(difficulty, stability, retrievability)
        };
        clamp_stability(next)
    }

    fn short_term_stability(&self, stability: f64, rating: Rating) -> f64 {
        let w = &self.parameters;
        let mut increase =
            (w.w(17) * (rating.as_f64() - 3.0 + w.w(18))).exp() * stability.powf(-w.w(19));
        if matches!(rating, Rating::Good | Rating::Easy) {
            increase = increase.max(1.0);
        }
        clamp_stability(stability * increase)
    }
}
