//! Card - the unit being scheduled
//!
//! A card carries its learning state and, once reviewed, its FSRS memory
//! state (stability + difficulty). Cards are values: a review never edits
//! the card it was given, it returns a new one. Callers can keep old
//! snapshots around and review distinct cards from different threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FsrsError;
use crate::fsrs::{MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_STABILITY};

// ============================================================================
// STATE
// ============================================================================

/// Learning state of a card.
///
/// `New` is kept for interface completeness with stored data. The scheduler
/// never produces it and has no transitions out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum State {
    New = 0,
    /// Working through the learning steps
    #[default]
    Learning = 1,
    /// Graduated; scheduled by the forgetting curve
    Review = 2,
    /// Lapsed from Review; working through the relearning steps
    Relearning = 3,
}

impl State {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            State::New => "new",
            State::Learning => "learning",
            State::Review => "review",
            State::Relearning => "relearning",
        }
    }

    /// Whether cards in this state carry a step index
    pub fn uses_steps(&self) -> bool {
        matches!(self, State::Learning | State::Relearning)
    }
}

impl TryFrom<u8> for State {
    type Error = FsrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::New),
            1 => Ok(State::Learning),
            2 => Ok(State::Review),
            3 => Ok(State::Relearning),
            other => Err(FsrsError::InvalidState(format!("unknown state ordinal {other}"))),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CARD
// ============================================================================

/// A flashcard with its scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", into = "CardRecord")]
pub struct Card {
    pub(crate) id: Uuid,
    pub(crate) state: State,
    pub(crate) step: Option<usize>,
    pub(crate) stability: Option<f64>,
    pub(crate) difficulty: Option<f64>,
    pub(crate) due: DateTime<Utc>,
    pub(crate) last_review: Option<DateTime<Utc>>,
}

impl Default for Card {
    fn default() -> Self {
        Self::new()
    }
}

impl Card {
    /// Fresh card, due now
    pub fn new() -> Self {
        Self::created_at(Utc::now())
    }

    /// Fresh card, due at `now`
    pub fn created_at(now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), now)
    }

    /// Fresh card with a caller-chosen id
    pub fn with_id(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            state: State::Learning,
            step: Some(0),
            stability: None,
            difficulty: None,
            due: now,
            last_review: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Current learning/relearning step (None while in Review)
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Memory stability in days (None until the first review)
    pub fn stability(&self) -> Option<f64> {
        self.stability
    }

    /// Difficulty in [1, 10] (None until the first review)
    pub fn difficulty(&self) -> Option<f64> {
        self.difficulty
    }

    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    pub fn last_review(&self) -> Option<DateTime<Utc>> {
        self.last_review
    }

    /// `(stability, difficulty)` once the card has been reviewed
    pub fn memory_state(&self) -> Option<(f64, f64)> {
        self.stability.zip(self.difficulty)
    }

    /// True if the card has never been reviewed
    pub fn is_new(&self) -> bool {
        self.memory_state().is_none()
    }

    /// Check if the card is due at the given instant
    pub fn is_due_at(&self, time: DateTime<Utc>) -> bool {
        self.due <= time
    }

    /// Rehydrate a card from its persisted record, checking its invariants
    pub fn from_record(record: CardRecord) -> Result<Self, FsrsError> {
        let (stability, difficulty) = match (record.stability, record.difficulty) {
            (Some(s), Some(d)) => {
                if !s.is_finite() || !d.is_finite() {
                    return Err(FsrsError::InvalidArgument(format!(
                        "card {} has a non-finite memory state",
                        record.id
                    )));
                }
                if s < MIN_STABILITY || !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) {
                    return Err(FsrsError::InvalidArgument(format!(
                        "card {} has stability {s} and difficulty {d}; expected stability >= \
                         {MIN_STABILITY} and difficulty in [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}]",
                        record.id
                    )));
                }
                (Some(s), Some(d))
            }
            (None, None) => (None, None),
            _ => {
                return Err(FsrsError::InvalidArgument(format!(
                    "card {} must have both stability and difficulty or neither",
                    record.id
                )));
            }
        };

        let step = match (record.state, record.step) {
            (State::Review, Some(step)) => {
                return Err(FsrsError::InvalidArgument(format!(
                    "card {} is in review but carries step {step}",
                    record.id
                )));
            }
            (state, None) if state.uses_steps() => Some(0),
            (_, step) => step,
        };

        Ok(Self {
            id: record.id,
            state: record.state,
            step,
            stability,
            difficulty,
            due: record.due,
            last_review: record.last_review,
        })
    }
}

// ============================================================================
// PERSISTED SHAPE
// ============================================================================

/// The shape a card is stored in by the caller.
///
/// Converting into a [`Card`] validates it; see [`Card::from_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: Uuid,
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    pub due: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            state: card.state,
            step: card.step,
            stability: card.stability,
            difficulty: card.difficulty,
            due: card.due,
            last_review: card.last_review,
        }
    }
}

impl TryFrom<CardRecord> for Card {
    type Error = FsrsError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        Card::from_record(record)
    }
}
