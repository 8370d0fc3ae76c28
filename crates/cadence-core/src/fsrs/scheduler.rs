//! FSRS Scheduler
//!
//! Turns a rating into a new card: updates the memory state through a
//! [`Calculator`], picks the next interval with the Learning / Review /
//! Relearning state machine, and fuzzes Review intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::{ConfigurationError, FsrsError, Result};
use crate::fsrs::algorithm::{Calculator, FsrsCalculator};
use crate::fsrs::fuzz::{Fuzzer, RandomFuzzer};
use crate::fsrs::parameters::{DEFAULT_MAXIMUM_INTERVAL, DEFAULT_RETENTION, Parameters};
use crate::memory::{Card, Rating, ReviewLog, State};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// CONFIG
// ============================================================================

/// Scheduler options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Target probability of recall when a Review card comes due, in (0, 1]
    pub desired_retention: f64,
    /// Longest interval ever scheduled (days)
    pub maximum_interval: u32,
    /// Whether Review intervals get randomized
    pub enable_fuzzing: bool,
    /// Steps a new card goes through before graduating (seconds when serialized)
    #[serde(with = "step_seconds")]
    pub learning_steps: Vec<Duration>,
    /// Steps a lapsed card goes through before returning to Review
    #[serde(with = "step_seconds")]
    pub relearning_steps: Vec<Duration>,
    /// Model weights
    pub parameters: Parameters,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            desired_retention: DEFAULT_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            enable_fuzzing: true,
            learning_steps: vec![Duration::minutes(1), Duration::minutes(10)],
            relearning_steps: vec![Duration::minutes(10)],
            parameters: Parameters::default(),
        }
    }
}

impl SchedulerConfig {
    /// Check the options that `Parameters` does not already guarantee
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let retention = self.desired_retention;
        if !(retention > 0.0 && retention <= 1.0) {
            return Err(ConfigurationError::DesiredRetention(retention));
        }
        if self.maximum_interval == 0 {
            return Err(ConfigurationError::MaximumInterval);
        }
        for (kind, steps) in [
            ("learning", &self.learning_steps),
            ("relearning", &self.relearning_steps),
        ] {
            if let Some(index) = steps.iter().position(|step| *step < Duration::zero()) {
                return Err(ConfigurationError::NegativeStep { kind, index });
            }
        }
        Ok(())
    }
}

/// Steps are stored as whole seconds
mod step_seconds {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(steps: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(steps.iter().map(|step| step.num_seconds()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Duration>, D::Error> {
        Vec::<i64>::deserialize(deserializer)?
            .into_iter()
            .map(|secs| {
                Duration::try_seconds(secs)
                    .ok_or_else(|| D::Error::custom(format!("step of {secs}s is out of range")))
            })
            .collect()
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResult {
    /// The card as it stands after the review
    pub card: Card,
    /// Log entry for the caller's history
    pub review_log: ReviewLog,
}

impl ReviewResult {
    /// Scheduled gap between this review and the next due date
    pub fn interval(&self) -> Duration {
        self.card.due() - self.review_log.review_datetime()
    }
}

/// What each rating would do to a card, without committing to any
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResults {
    pub again: ReviewResult,
    pub hard: ReviewResult,
    pub good: ReviewResult,
    pub easy: ReviewResult,
}

impl PreviewResults {
    pub fn get(&self, rating: Rating) -> &ReviewResult {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

/// Next state/step/interval picked by the state machine
#[derive(Debug, Clone, Copy)]
struct Transition {
    state: State,
    step: Option<usize>,
    interval: Duration,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// FSRS-6 scheduler.
///
/// Holds read-only configuration plus the calculator and fuzzer. Reviews
/// never touch the card passed in, so one scheduler can serve many threads
/// reviewing distinct cards.
pub struct Scheduler {
    config: SchedulerConfig,
    calculator: Box<dyn Calculator>,
    fuzzer: Box<dyn Fuzzer>,
}

impl Default for Scheduler {
    fn default() -> Self {
        let config = SchedulerConfig::default();
        let calculator = FsrsCalculator::new(config.parameters.clone());
        Self::build(config, calculator, RandomFuzzer::new())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create with the FSRS-6 calculator and an entropy-seeded fuzzer
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        let calculator = FsrsCalculator::new(config.parameters.clone());
        Self::with_components(config, calculator, RandomFuzzer::new())
    }

    /// Create with caller-supplied calculator and fuzzer
    pub fn with_components(
        config: SchedulerConfig,
        calculator: impl Calculator + 'static,
        fuzzer: impl Fuzzer + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, calculator, fuzzer))
    }

    fn build(
        config: SchedulerConfig,
        calculator: impl Calculator + 'static,
        fuzzer: impl Fuzzer + 'static,
    ) -> Self {
        Self {
            config,
            calculator: Box::new(calculator),
            fuzzer: Box::new(fuzzer),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Review a card at `review_time`.
    ///
    /// Returns a new card and the matching log entry; `card` is left as is.
    pub fn review_card(
        &self,
        card: &Card,
        rating: Rating,
        review_time: DateTime<Utc>,
        review_duration: Option<u64>,
    ) -> Result<ReviewResult> {
        let elapsed_days = card
            .last_review()
            .map(|last| days_between(last, review_time))
            .unwrap_or(0.0);

        let (stability, difficulty) = self.next_memory_state(card, elapsed_days, rating);
        trace!(
            card_id = %card.id(),
            elapsed_days,
            stability,
            difficulty,
            "Memory state updated"
        );

        let transition = self.transition(card, stability, rating)?;
        let mut interval = transition.interval;
        if self.config.enable_fuzzing && transition.state == State::Review {
            interval = self.fuzzer.apply_fuzz(interval, self.config.maximum_interval);
        }

        debug!(
            card_id = %card.id(),
            %rating,
            from = %card.state(),
            to = %transition.state,
            interval_secs = interval.num_seconds(),
            "Card reviewed"
        );

        let next = Card {
            state: transition.state,
            step: transition.step,
            stability: Some(stability),
            difficulty: Some(difficulty),
            due: review_time + interval,
            last_review: Some(review_time),
            ..card.clone()
        };
        let review_log = ReviewLog::new(card.id(), rating, review_time, review_duration);

        Ok(ReviewResult {
            card: next,
            review_log,
        })
    }

    /// Review a card at the current instant
    pub fn review_card_now(
        &self,
        card: &Card,
        rating: Rating,
        review_duration: Option<u64>,
    ) -> Result<ReviewResult> {
        self.review_card(card, rating, Utc::now(), review_duration)
    }

    /// Outcome of every rating for `card` at `review_time`
    pub fn preview_card(&self, card: &Card, review_time: DateTime<Utc>) -> Result<PreviewResults> {
        Ok(PreviewResults {
            again: self.review_card(card, Rating::Again, review_time, None)?,
            hard: self.review_card(card, Rating::Hard, review_time, None)?,
            good: self.review_card(card, Rating::Good, review_time, None)?,
            easy: self.review_card(card, Rating::Easy, review_time, None)?,
        })
    }

    /// Replay a review history from a fresh card.
    ///
    /// Logs are applied in chronological order; every log must belong to
    /// `card_id`.
    pub fn rebuild_card(
        &self,
        card_id: Uuid,
        created_at: DateTime<Utc>,
        logs: &[ReviewLog],
    ) -> Result<Card> {
        if let Some(stray) = logs.iter().find(|log| log.card_id() != card_id) {
            return Err(FsrsError::InvalidArgument(format!(
                "review log for card {} cannot rebuild card {card_id}",
                stray.card_id()
            )));
        }

        let mut ordered: Vec<&ReviewLog> = logs.iter().collect();
        ordered.sort_by_key(|log| log.review_datetime());

        ordered.into_iter().try_fold(Card::with_id(card_id, created_at), |card, log| {
            self.review_card(&card, log.rating(), log.review_datetime(), log.review_duration())
                .map(|result| result.card)
        })
    }

    /// Probability of recalling `card` at `now` (0 if never reviewed)
    pub fn card_retrievability_at(&self, card: &Card, now: DateTime<Utc>) -> f64 {
        match (card.last_review(), card.stability()) {
            (Some(last), Some(stability)) => {
                let elapsed_days = days_between(last, now).max(0.0);
                let params = &self.config.parameters;
                self.calculator
                    .retrievability(elapsed_days, stability, params.decay(), params.factor())
            }
            _ => 0.0,
        }
    }

    /// Probability of recalling `card` right now
    pub fn card_retrievability(&self, card: &Card) -> f64 {
        self.card_retrievability_at(card, Utc::now())
    }

    // ========================================================================
    // MEMORY STATE
    // ========================================================================

    fn next_memory_state(&self, card: &Card, elapsed_days: f64, rating: Rating) -> (f64, f64) {
        let calc = &self.calculator;
        match card.memory_state() {
            None => (calc.initial_stability(rating), calc.initial_difficulty(rating)),
            Some((stability, difficulty)) if elapsed_days < 1.0 => (
                calc.short_term_stability(stability, rating),
                calc.next_difficulty(difficulty, rating),
            ),
            Some((stability, difficulty)) => {
                let params = &self.config.parameters;
                let r = calc.retrievability(elapsed_days, stability, params.decay(), params.factor());
                (
                    calc.next_stability(difficulty, stability, r, rating),
                    calc.next_difficulty(difficulty, rating),
                )
            }
        }
    }

    // ========================================================================
    // STATE MACHINE
    // ========================================================================

    /// Branches on the state the card was in before this review
    fn transition(&self, card: &Card, stability: f64, rating: Rating) -> Result<Transition> {
        match card.state() {
            State::Learning => Ok(self.step_transition(
                card,
                &self.config.learning_steps,
                stability,
                rating,
            )),
            State::Relearning => Ok(self.step_transition(
                card,
                &self.config.relearning_steps,
                stability,
                rating,
            )),
            State::Review => Ok(self.review_transition(stability, rating)),
            State::New => Err(FsrsError::InvalidState(format!(
                "card {} is in state '{}', which the scheduler never produces",
                card.id(),
                card.state()
            ))),
        }
    }

    /// Learning and Relearning share the same step logic
    fn step_transition(
        &self,
        card: &Card,
        steps: &[Duration],
        stability: f64,
        rating: Rating,
    ) -> Transition {
        let Some((&first, rest)) = steps.split_first() else {
            return self.graduate(stability);
        };
        let state = card.state();
        let current = card.step().unwrap_or(0);

        match rating {
            Rating::Again => Transition {
                state,
                step: Some(0),
                interval: first,
            },
            Rating::Hard => {
                let interval = if current == 0 {
                    match rest.first() {
                        Some(&second) => (first + second) / 2,
                        None => scale(first, 1.5),
                    }
                } else {
                    match steps.get(current) {
                        Some(&step) => step,
                        None => {
                            warn!(
                                card_id = %card.id(),
                                step = current,
                                configured = steps.len(),
                                "Card step beyond configured steps, using last step"
                            );
                            steps[steps.len() - 1]
                        }
                    }
                };
                Transition {
                    state,
                    step: Some(current),
                    interval,
                }
            }
            Rating::Good => {
                let next_step = current + 1;
                match steps.get(next_step) {
                    Some(&interval) => Transition {
                        state,
                        step: Some(next_step),
                        interval,
                    },
                    None => self.graduate(stability),
                }
            }
            Rating::Easy => self.graduate(stability),
        }
    }

    fn review_transition(&self, stability: f64, rating: Rating) -> Transition {
        match (rating, self.config.relearning_steps.first()) {
            (Rating::Again, Some(&first)) => Transition {
                state: State::Relearning,
                step: Some(0),
                interval: first,
            },
            _ => Transition {
                state: State::Review,
                step: None,
                interval: self.review_interval(stability),
            },
        }
    }

    fn graduate(&self, stability: f64) -> Transition {
        Transition {
            state: State::Review,
            step: None,
            interval: self.review_interval(stability),
        }
    }

    fn review_interval(&self, stability: f64) -> Duration {
        let params = &self.config.parameters;
        let days = self.calculator.next_interval(
            stability,
            self.config.desired_retention,
            params.decay(),
            params.factor(),
            self.config.maximum_interval,
        );
        Duration::days(days as i64)
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn scale(step: Duration, factor: f64) -> Duration {
    Duration::milliseconds((step.num_milliseconds() as f64 * factor).round() as i64)
}
