//! Quoted market lines and the bounds they imply.
//!
//! Moneyline axis: upper = p(away price), lower = 1 - p(home price).
//! Total axis: upper = p(over price), lower = 1 - p(under price).
//! The simulated value compared against each axis is the away win
//! probability and the over probability respectively.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimCoreError};
use crate::odds::american_odds_to_probability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketAxis {
    Moneyline,
    Total,
}

impl fmt::Display for MarketAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketAxis::Moneyline => write!(f, "moneyline"),
            MarketAxis::Total => write!(f, "total"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalLine {
    pub line: f64,
    pub odds: f64,
}

/// Prices quoted by the book for one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketLines {
    #[serde(rename = "awayML")]
    pub away_ml: f64,
    #[serde(rename = "homeML")]
    pub home_ml: f64,
    pub over: TotalLine,
    pub under: TotalLine,
}

impl MarketLines {
    /// Implied bounds for both axes.
    ///
    /// Fails with `MarketInconsistency` when an axis has `upper <= lower` or
    /// is wider than `max_width` (two favourites, or a heavily juiced quote).
    pub fn bounds(&self, max_width: f64) -> Result<MarketBounds> {
        let moneyline = AxisBounds::new(
            MarketAxis::Moneyline,
            american_odds_to_probability(self.away_ml)?,
            1.0 - american_odds_to_probability(self.home_ml)?,
            max_width,
        )?;
        let total = AxisBounds::new(
            MarketAxis::Total,
            american_odds_to_probability(self.over.odds)?,
            1.0 - american_odds_to_probability(self.under.odds)?,
            max_width,
        )?;
        Ok(MarketBounds { moneyline, total })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub upper: f64,
    pub lower: f64,
}

impl AxisBounds {
    fn new(axis: MarketAxis, upper: f64, lower: f64, max_width: f64) -> Result<Self> {
        if upper <= lower || upper - lower > max_width {
            return Err(SimCoreError::MarketInconsistency { axis, upper, lower });
        }
        Ok(Self { upper, lower })
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn midpoint(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    pub fn compare(&self, sim_value: f64) -> AxisDifference {
        AxisDifference {
            sim_value,
            upper_bound: self.upper,
            lower_bound: self.lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketBounds {
    pub moneyline: AxisBounds,
    pub total: AxisBounds,
}

/// Simulated value against one axis's bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisDifference {
    pub sim_value: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
}

impl AxisDifference {
    pub fn midpoint(&self) -> f64 {
        (self.upper_bound + self.lower_bound) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Signed distance from the midpoint in percentage points
    pub fn deviation_pct(&self) -> f64 {
        100.0 * (self.sim_value - self.midpoint())
    }

    /// Strictly between the bounds
    pub fn in_bounds(&self) -> bool {
        self.sim_value > self.lower_bound && self.sim_value < self.upper_bound
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketLineDifference {
    #[serde(rename = "mlAway")]
    pub moneyline: AxisDifference,
    pub total: AxisDifference,
}
