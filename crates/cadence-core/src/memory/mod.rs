//! Memory Module
//!
//! Data model passed in and out of the scheduler:
//! - Cards and their persisted record shape
//! - Learning states
//! - Ratings and review logs

mod card;
mod review;

pub use card::{Card, CardRecord, State};
pub use review::{Rating, ReviewLog};
