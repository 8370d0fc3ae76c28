//! Ratings and review logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FsrsError;

// ============================================================================
// RATING
// ============================================================================

/// Recall rating given by the learner.
///
/// The ordinals are load-bearing: the memory formulas index weights with
/// `rating - 1` and shift difficulty by `rating - 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rating {
    /// Forgot the card
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled after hesitation
    Good = 3,
    /// Recalled immediately
    Easy = 4,
}

impl Rating {
    /// All ratings in ordinal order
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Ordinal value (1..=4)
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Ordinal as f64, for use inside the formulas
    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self as u8)
    }

    /// True for the ratings that count as a successful recall
    pub fn is_success(self) -> bool {
        self != Rating::Again
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = FsrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(FsrsError::InvalidArgument(format!(
                "rating must be between 1 and 4, got {other}"
            ))),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating as u8
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// REVIEW LOG
// ============================================================================

/// A single review event.
///
/// Logs are append-only history owned by the caller's store; nothing in this
/// crate mutates one after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    card_id: Uuid,
    rating: Rating,
    review_datetime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    review_duration: Option<u64>,
}

impl ReviewLog {
    pub fn new(
        card_id: Uuid,
        rating: Rating,
        review_datetime: DateTime<Utc>,
        review_duration: Option<u64>,
    ) -> Self {
        Self {
            card_id,
            rating,
            review_datetime,
            review_duration,
        }
    }

    /// The id of the card being reviewed
    pub fn card_id(&self) -> Uuid {
        self.card_id
    }

    /// The rating given during the review
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// When the review happened
    pub fn review_datetime(&self) -> DateTime<Utc> {
        self.review_datetime
    }

    /// Milliseconds the review took, if the caller measured it
    pub fn review_duration(&self) -> Option<u64> {
        self.review_duration
    }
}
