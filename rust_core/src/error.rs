//! Error taxonomy for aggregation and calibration.
//!
//! Every failure here is local and synchronous to one aggregation or
//! calibration call. None of them are retried automatically.

use crate::calibration::leans::LeanParameters;
use crate::calibration::market::{MarketAxis, MarketLineDifference};
use thiserror::Error;

/// Main error type for the simulation core
#[derive(Error, Debug)]
pub enum SimCoreError {
    // Period resolution errors
    #[error("Invalid period: type code {code:?} with period number {number}")]
    InvalidPeriod { code: String, number: u8 },

    #[error("Malformed simulation batch: {0}")]
    MalformedBatch(String),

    // Market input errors
    #[error(
        "Market inconsistency on {axis} axis: upper bound {upper:.4} vs lower bound {lower:.4}. Please check your {axis} lines."
    )]
    MarketInconsistency {
        axis: MarketAxis,
        upper: f64,
        lower: f64,
    },

    #[error("Invalid American odds: {0} (must be >= +100 or <= -100)")]
    InvalidOdds(String),

    #[error("Invalid probability: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidProbability(f64),

    // Calibration errors
    #[error("No optimal leans found after {iterations} iterations. Please try again.")]
    ConvergenceFailure {
        iterations: u32,
        leans: Box<LeanParameters>,
        difference: Box<MarketLineDifference>,
    },

    #[error("Simulator failed: {0}")]
    Simulator(#[source] anyhow::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimCoreError {
    pub(crate) fn invalid_period(code: impl Into<String>, number: u8) -> Self {
        Self::InvalidPeriod {
            code: code.into(),
            number,
        }
    }
}

/// Result type alias for the simulation core
pub type Result<T> = std::result::Result<T, SimCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_inconsistency_message_names_axis() {
        let err = SimCoreError::MarketInconsistency {
            axis: MarketAxis::Moneyline,
            upper: 0.4,
            lower: 0.5833,
        };
        let msg = err.to_string();
        assert!(msg.contains("moneyline"));
        assert!(msg.contains("0.4000"));
    }

    #[test]
    fn test_invalid_period_message() {
        let err = SimCoreError::invalid_period("H", 2);
        assert_eq!(
            err.to_string(),
            "Invalid period: type code \"H\" with period number 2"
        );
    }
}
