//! # Cadence Core
//!
//! Spaced repetition engine built on the FSRS-6 memory model:
//!
//! - **Calculator**: closed-form stability, difficulty and retrievability updates
//! - **Scheduler**: Learning / Review / Relearning state machine producing due dates
//! - **Fuzzing**: bounded random spread on Review intervals
//!
//! Cards are plain values. Every review returns a new card and a review log;
//! storing either is up to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use cadence_core::{Card, Rating, Scheduler, SchedulerConfig};
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default())?;
//! let card = Card::new();
//!
//! let result = scheduler.review_card_now(&card, Rating::Good, None)?;
//! assert!(result.card.due() > card.due());
//!
//! let r = scheduler.card_retrievability(&result.card);
//! assert!(r > 0.99);
//! # Ok::<(), cadence_core::FsrsError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod error;
pub mod fsrs;
pub mod memory;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Errors
pub use error::{ConfigurationError, FsrsError, Result};

// Memory types
pub use memory::{Card, CardRecord, Rating, ReviewLog, State};

// FSRS-6 algorithm
pub use fsrs::{
    fuzz_range,
    next_interval,
    // Core functions for advanced usage
    retrievability,
    Calculator,
    FsrsCalculator,
    Fuzzer,
    NoFuzz,
    Parameters,
    PreviewResults,
    RandomFuzzer,
    ReviewResult,
    Scheduler,
    SchedulerConfig,
    DEFAULT_RETENTION,
    FSRS6_WEIGHTS,
    MIN_STABILITY,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (6 = 21 parameters)
pub const FSRS_VERSION: u8 = 6;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Card, FsrsError, Rating, Result, ReviewLog, ReviewResult, Scheduler, SchedulerConfig,
        State,
    };
}
