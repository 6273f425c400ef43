//! Calibration heuristics and environment loading
//!
//! This module holds every tunable of the leans search:
//! - Iteration ceiling and games per iteration
//! - Convergence band and midpoint threshold
//! - Adjustment trigger and damping
//! - Maximum accepted width of a market's implied bounds

use std::env;

use super::leans::{LeanAdjustment, TeamAdjustment};
use super::market::{AxisDifference, MarketLineDifference};

/// Simulation runs before giving up
pub const DEFAULT_MAX_ITERATIONS: u32 = 21;

/// Games simulated per iteration
pub const DEFAULT_GAME_COUNT: u32 = 40_000;

/// Within this distance (probability) of the bound midpoint counts as converged
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.0015;

/// Fraction of the bound interval where the convergence band starts
pub const BAND_LOWER_FRACTION: f64 = 3.0 / 8.0;

/// Fraction of the bound interval where the convergence band ends
pub const BAND_UPPER_FRACTION: f64 = 6.0 / 8.0;

/// Deviations (percentage points) above this always trigger an adjustment
pub const DEFAULT_ADJUSTMENT_THRESHOLD_PCT: f64 = 0.25;

/// Deviation is split across hitter and pitcher leans of both teams
pub const DEFAULT_DAMPING_FACTOR: f64 = 8.0;

/// Widest implied interval accepted from a two-way quote.
///
/// Rejects two-favourite quotes such as -150/-140, but also high-vig books:
/// -130/-130 is about 0.13 wide. Raise `max_bound_width` (or set
/// `CALIBRATION_MAX_BOUND_WIDTH`) when calibrating against 20-cent lines.
pub const DEFAULT_MAX_BOUND_WIDTH: f64 = 0.10;

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPolicy {
    pub max_iterations: u32,
    pub game_count: u32,
    pub convergence_threshold: f64,
    pub adjustment_threshold_pct: f64,
    pub damping_factor: f64,
    pub max_bound_width: f64,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            game_count: DEFAULT_GAME_COUNT,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            adjustment_threshold_pct: DEFAULT_ADJUSTMENT_THRESHOLD_PCT,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            max_bound_width: DEFAULT_MAX_BOUND_WIDTH,
        }
    }
}

impl CalibrationPolicy {
    /// Load policy from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let max_iterations = env::var("CALIBRATION_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ITERATIONS)
            .clamp(1, 100);

        let game_count = env::var("CALIBRATION_GAME_COUNT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_GAME_COUNT)
            .clamp(100, 1_000_000);

        let convergence_threshold = env::var("CALIBRATION_CONVERGENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_CONVERGENCE_THRESHOLD)
            .clamp(0.0, 0.05);

        let adjustment_threshold_pct = env::var("CALIBRATION_ADJUSTMENT_THRESHOLD_PCT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_ADJUSTMENT_THRESHOLD_PCT)
            .clamp(0.0, 5.0);

        let damping_factor = env::var("CALIBRATION_DAMPING_FACTOR")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_DAMPING_FACTOR)
            .clamp(1.0, 100.0);

        let max_bound_width = env::var("CALIBRATION_MAX_BOUND_WIDTH")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_MAX_BOUND_WIDTH)
            .clamp(0.01, 0.5);

        Self {
            max_iterations,
            game_count,
            convergence_threshold,
            adjustment_threshold_pct,
            damping_factor,
            max_bound_width,
        }
    }

    /// Sim value lies inside the central band or near the midpoint,
    /// whichever window is wider on each side.
    pub fn axis_converged(&self, diff: &AxisDifference) -> bool {
        let band_low = diff.lower_bound + diff.width() * BAND_LOWER_FRACTION;
        let band_high = diff.lower_bound + diff.width() * BAND_UPPER_FRACTION;
        let mid = diff.midpoint();

        let low = band_low.min(mid - self.convergence_threshold);
        let high = band_high.max(mid + self.convergence_threshold);
        diff.sim_value > low && diff.sim_value < high
    }

    pub fn is_converged(&self, difference: &MarketLineDifference) -> bool {
        self.axis_converged(&difference.moneyline) && self.axis_converged(&difference.total)
    }

    pub fn needs_adjustment(&self, diff: &AxisDifference) -> bool {
        diff.deviation_pct().abs() > self.adjustment_threshold_pct || !diff.in_bounds()
    }

    /// Magnitude applied to each of the four team leans
    pub fn adjustment_size(&self, diff: &AxisDifference) -> f64 {
        diff.deviation_pct().abs() / self.damping_factor
    }

    /// Away too strong: weaken away hitting and pitching, strengthen home.
    fn moneyline_adjustment(&self, diff: &AxisDifference) -> LeanAdjustment {
        if !self.needs_adjustment(diff) {
            return LeanAdjustment::default();
        }
        let size = self.adjustment_size(diff);
        let away = if diff.deviation_pct() > 0.0 { -size } else { size };
        LeanAdjustment {
            away: TeamAdjustment {
                hitter: away,
                pitcher: away,
            },
            home: TeamAdjustment {
                hitter: -away,
                pitcher: -away,
            },
        }
    }

    /// Total too high: strengthen both pitching staffs, weaken both lineups.
    fn total_adjustment(&self, diff: &AxisDifference) -> LeanAdjustment {
        if !self.needs_adjustment(diff) {
            return LeanAdjustment::default();
        }
        let size = self.adjustment_size(diff);
        let pitcher = if diff.deviation_pct() > 0.0 { size } else { -size };
        let team = TeamAdjustment {
            hitter: -pitcher,
            pitcher,
        };
        LeanAdjustment {
            away: team,
            home: team,
        }
    }

    /// Combined adjustment for both axes
    pub fn adjustment(&self, difference: &MarketLineDifference) -> LeanAdjustment {
        self.moneyline_adjustment(&difference.moneyline) + self.total_adjustment(&difference.total)
    }
}
