//! Optimal leans search
//!
//! Repeats simulate -> aggregate -> compare -> adjust until the simulated
//! away win probability and over probability both sit inside the band
//! implied by the quoted market, or the iteration ceiling is hit.
//!
//! Each iteration needs the previous iteration's batch, so the loop is
//! sequential; aggregation inside an iteration runs on the rayon pool.

pub mod leans;
pub mod market;
pub mod policy;

use std::sync::Arc;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregation::sides::calculate_sides_counts;
use crate::aggregation::totals::calculate_totals_counts;
use crate::aggregation::LineKey;
use crate::error::{Result, SimCoreError};
use crate::models::{
    MainMarket, MainMarketKind, MarketLineSpec, MatchupLineups, SimulationBatch,
    StatCaptureConfig,
};
use crate::odds::{counts_to_probability, PushPolicy};
use crate::period::PeriodDescriptor;

pub use leans::{LeanAdjustment, LeanParameters, TeamAdjustment, TeamLeans, LEAN_LIMIT};
pub use market::{AxisBounds, AxisDifference, MarketAxis, MarketBounds, MarketLineDifference, MarketLines, TotalLine};
pub use policy::CalibrationPolicy;

/// External game simulator
///
/// Given lineups and leans, returns `game_count` independent games.
#[async_trait]
pub trait GameSimulator: Send + Sync {
    async fn simulate(
        &self,
        lineups: &MatchupLineups,
        leans: &LeanParameters,
        game_count: u32,
    ) -> anyhow::Result<SimulationBatch>;
}

/// Converged leans and the state they were found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalLeans {
    pub leans: LeanParameters,
    /// Simulator runs used, including the converged one
    pub iterations: u32,
    pub difference: MarketLineDifference,
}

pub struct LeansFinder {
    simulator: Arc<dyn GameSimulator>,
    policy: CalibrationPolicy,
}

impl LeansFinder {
    /// Finder with the built-in policy defaults. Environment overrides are
    /// only read by [`LeansFinder::from_env`].
    pub fn new(simulator: Arc<dyn GameSimulator>) -> Self {
        Self::with_policy(simulator, CalibrationPolicy::default())
    }

    /// Finder with policy loaded from the `CALIBRATION_*` environment variables
    pub fn from_env(simulator: Arc<dyn GameSimulator>) -> Self {
        Self::with_policy(simulator, CalibrationPolicy::from_env())
    }

    pub fn with_policy(simulator: Arc<dyn GameSimulator>, policy: CalibrationPolicy) -> Self {
        Self { simulator, policy }
    }

    pub fn policy(&self) -> &CalibrationPolicy {
        &self.policy
    }

    /// Search from neutral leans
    pub async fn find_optimal_leans(
        &self,
        lineups: &MatchupLineups,
        market: &MarketLines,
    ) -> Result<OptimalLeans> {
        self.find_optimal_leans_from(lineups, market, LeanParameters::default())
            .await
    }

    /// Search starting from `initial`. Per-player leans are carried through
    /// unchanged; only team-level leans are adjusted.
    pub async fn find_optimal_leans_from(
        &self,
        lineups: &MatchupLineups,
        market: &MarketLines,
        initial: LeanParameters,
    ) -> Result<OptimalLeans> {
        // Reject bad quotes before any simulation runs
        let bounds = market.bounds(self.policy.max_bound_width)?;
        let config = calibration_config(market);

        let mut leans = initial.clamped();
        let mut difference = MarketLineDifference::default();

        for iteration in 1..=self.policy.max_iterations {
            let batch = self
                .simulator
                .simulate(lineups, &leans, self.policy.game_count)
                .await
                .map_err(SimCoreError::Simulator)?;

            difference = measure_difference(&batch, &config, &bounds, market.over.line)?;
            info!(
                "Iteration {}: moneyline sim {:.4} in [{:.4}, {:.4}], total sim {:.4} in [{:.4}, {:.4}]",
                iteration,
                difference.moneyline.sim_value,
                difference.moneyline.lower_bound,
                difference.moneyline.upper_bound,
                difference.total.sim_value,
                difference.total.lower_bound,
                difference.total.upper_bound,
            );

            if self.policy.is_converged(&difference) {
                info!("Optimal leans found after {} iterations: {:?}", iteration, leans);
                return Ok(OptimalLeans {
                    leans,
                    iterations: iteration,
                    difference,
                });
            }

            let adjustment = self.policy.adjustment(&difference);
            leans.apply(&adjustment);
            debug!("Adjusted by {:?}, leans now {:?}", adjustment, leans);
        }

        warn!(
            "No optimal leans after {} iterations (last difference {:?})",
            self.policy.max_iterations, difference
        );
        Err(SimCoreError::ConvergenceFailure {
            iterations: self.policy.max_iterations,
            leans: Box::new(leans),
            difference: Box::new(difference),
        })
    }
}

/// Moneyline plus the quoted over and under lines, full game
fn calibration_config(market: &MarketLines) -> StatCaptureConfig {
    let full_game = PeriodDescriptor::full_game();
    StatCaptureConfig::new(
        "optimalLeans",
        vec![
            MarketLineSpec::Main(MainMarket::moneyline()),
            MarketLineSpec::Main(MainMarket::new(
                MainMarketKind::Total,
                full_game,
                market.over.line,
            )),
            MarketLineSpec::Main(MainMarket::new(
                MainMarketKind::Total,
                full_game,
                market.under.line,
            )),
        ],
    )
}

fn measure_difference(
    batch: &SimulationBatch,
    config: &StatCaptureConfig,
    bounds: &MarketBounds,
    over_line: f64,
) -> Result<MarketLineDifference> {
    if batch.is_empty() {
        return Err(SimCoreError::MalformedBatch(
            "simulator returned no games".to_string(),
        ));
    }

    let full_game = PeriodDescriptor::full_game();
    let sides = calculate_sides_counts(batch, config)?;
    let totals = calculate_totals_counts(batch, config)?;

    let away_ml = sides
        .away
        .get(&LineKey::new(full_game, 0.0))
        .ok_or_else(|| SimCoreError::MalformedBatch("missing away moneyline counts".to_string()))?;
    let over = totals
        .combined
        .get(&full_game)
        .and_then(|lines| lines.get(&OrderedFloat(over_line)))
        .ok_or_else(|| {
            SimCoreError::MalformedBatch(format!("missing over counts at {}", over_line))
        })?;

    Ok(MarketLineDifference {
        moneyline: bounds
            .moneyline
            .compare(counts_to_probability(away_ml, PushPolicy::Refund)),
        total: bounds
            .total
            .compare(counts_to_probability(&over.over, PushPolicy::Refund)),
    })
}
