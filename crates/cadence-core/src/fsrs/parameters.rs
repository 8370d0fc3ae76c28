//! FSRS-6 parameters
//!
//! The 21-weight vector plus the bounds each weight must respect. Bounds
//! are checked once, when the value is built; a `Parameters` that exists is
//! always in bounds.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of FSRS-6 weights
pub const PARAMETER_COUNT: usize = 21;

/// Stability floor (days)
pub const MIN_STABILITY: f64 = 0.001;

/// Stability ceiling used only for weight bounds, never applied at runtime
pub const MAX_STABILITY: f64 = 100.0;

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Default forgetting-curve decay (w20)
pub const DEFAULT_DECAY: f64 = 0.1542;

/// Default target retrievability
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Default cap on scheduled intervals (days)
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Default FSRS-6 weights
pub const FSRS6_WEIGHTS: [f64; PARAMETER_COUNT] = [
    0.212, 1.2931, 2.3065, 8.2956, // w0-w3: initial stability per rating
    6.4133, // w4: initial difficulty base
    0.8334, // w5: initial difficulty rating scale
    3.0194, // w6: difficulty delta per rating
    0.001,  // w7: mean reversion
    1.8722, // w8: recall stability scale
    0.1666, // w9: recall stability decay in S
    0.796,  // w10: recall retrievability sensitivity
    1.4835, // w11: forget stability scale
    0.0614, // w12: forget difficulty exponent
    0.2629, // w13: forget stability exponent
    1.6483, // w14: forget retrievability sensitivity
    0.6014, // w15: hard penalty
    1.8729, // w16: easy bonus
    0.5425, // w17: short-term scale
    0.0912, // w18: short-term offset
    0.0658, // w19: same-day S^-w19 term
    DEFAULT_DECAY, // w20: decay
];

/// Lower bound for each weight
pub const LOWER_BOUNDS: [f64; PARAMETER_COUNT] = [
    MIN_STABILITY, MIN_STABILITY, MIN_STABILITY, MIN_STABILITY,
    1.0, 0.001, 0.001, 0.001, 0.0, 0.0,
    0.001, 0.001, 0.001, 0.001, 0.0, 0.0,
    1.0, 0.0, 0.0, 0.0, 0.1,
];

/// Upper bound for each weight
pub const UPPER_BOUNDS: [f64; PARAMETER_COUNT] = [
    MAX_STABILITY, MAX_STABILITY, MAX_STABILITY, MAX_STABILITY,
    10.0, 4.0, 4.0, 0.75, 4.5, 0.8,
    3.5, 5.0, 0.25, 0.9, 4.0, 1.0,
    6.0, 2.0, 2.0, 0.8, 0.8,
];

// ============================================================================
// PARAMETERS
// ============================================================================

/// Validated weight vector with its bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParametersRecord", into = "ParametersRecord")]
pub struct Parameters {
    weights: Vec<f64>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            weights: FSRS6_WEIGHTS.to_vec(),
            lower_bounds: LOWER_BOUNDS.to_vec(),
            upper_bounds: UPPER_BOUNDS.to_vec(),
        }
    }
}

impl Parameters {
    /// Build from a weight vector using the default bounds
    pub fn new(weights: impl Into<Vec<f64>>) -> Result<Self, ConfigurationError> {
        Self::with_bounds(weights, LOWER_BOUNDS.to_vec(), UPPER_BOUNDS.to_vec())
    }

    /// Build from a weight vector and explicit bounds
    pub fn with_bounds(
        weights: impl Into<Vec<f64>>,
        lower_bounds: impl Into<Vec<f64>>,
        upper_bounds: impl Into<Vec<f64>>,
    ) -> Result<Self, ConfigurationError> {
        let params = Self {
            weights: weights.into(),
            lower_bounds: lower_bounds.into(),
            upper_bounds: upper_bounds.into(),
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let expected = self.lower_bounds.len();
        if self.weights.len() != expected {
            return Err(ConfigurationError::LengthMismatch {
                expected,
                actual: self.weights.len(),
            });
        }
        if self.upper_bounds.len() != expected {
            return Err(ConfigurationError::LengthMismatch {
                expected,
                actual: self.upper_bounds.len(),
            });
        }
        // The formulas index up to w20
        if expected != PARAMETER_COUNT {
            return Err(ConfigurationError::LengthMismatch {
                expected: PARAMETER_COUNT,
                actual: expected,
            });
        }

        for (index, ((&value, &lower), &upper)) in self
            .weights
            .iter()
            .zip(&self.lower_bounds)
            .zip(&self.upper_bounds)
            .enumerate()
        {
            // Written so NaN fails too
            if !(value >= lower && value <= upper) {
                return Err(ConfigurationError::OutOfBounds {
                    index,
                    value,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    /// Weight `w{index}`
    #[inline]
    pub fn w(&self, index: usize) -> f64 {
        self.weights[index]
    }

    /// Forgetting-curve exponent, `-w20`
    #[inline]
    pub fn decay(&self) -> f64 {
        -self.weights[20]
    }

    /// Curve factor chosen so that R(t = S) = 0.9
    #[inline]
    pub fn factor(&self) -> f64 {
        0.9_f64.powf(1.0 / self.decay()) - 1.0
    }
}

/// Serialized form of [`Parameters`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParametersRecord {
    weights: Vec<f64>,
    #[serde(default = "default_lower_bounds")]
    lower_bounds: Vec<f64>,
    #[serde(default = "default_upper_bounds")]
    upper_bounds: Vec<f64>,
}

fn default_lower_bounds() -> Vec<f64> {
    LOWER_BOUNDS.to_vec()
}

fn default_upper_bounds() -> Vec<f64> {
    UPPER_BOUNDS.to_vec()
}

impl TryFrom<ParametersRecord> for Parameters {
    type Error = ConfigurationError;

    fn try_from(record: ParametersRecord) -> Result<Self, Self::Error> {
        Parameters::with_bounds(record.weights, record.lower_bounds, record.upper_bounds)
    }
}

impl From<Parameters> for ParametersRecord {
    fn from(params: Parameters) -> Self {
        Self {
            weights: params.weights,
            lower_bounds: params.lower_bounds,
            upper_bounds: params.upper_bounds,
        }
    }
}
