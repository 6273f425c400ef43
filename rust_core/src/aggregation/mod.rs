//! Market aggregation over a simulation batch.
//!
//! This module provides:
//! - Sides (spread/moneyline) counts per period and line
//! - Totals (combined, home, away) over/under counts
//! - First-inning and scoring-order team props
//! - Player over/under props
//!
//! Per-game work runs on the rayon pool; aggregators are order-independent
//! reductions over the batch.

pub mod player_stats;
pub mod props;
pub mod sides;
pub mod totals;

use std::collections::BTreeMap;
use std::time::Instant;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{MatchupLineups, ScoreAtPeriod, SimulationBatch, StatCaptureConfig};
use crate::period::{score_at_period, PeriodDescriptor};

pub use player_stats::{AllPlayersPropsCounts, PlayerPropsCounts, PlayerWithTeam};
pub use props::{FirstInningCounts, PropsCounts, ScoringOrderCounts, TeamScoringOrderCounts};
pub use sides::SidesCounts;
pub use totals::{OverUnderCounts, TotalsCounts};

/// Numeric line usable as an ordered map key
pub type Line = OrderedFloat<f64>;

/// Structured (period, line) key for per-line results
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub period: PeriodDescriptor,
    pub line: Line,
}

impl LineKey {
    pub fn new(period: PeriodDescriptor, line: f64) -> Self {
        Self {
            period,
            line: OrderedFloat(line),
        }
    }
}

/// Per-period score series, resolved once per period and reused by every
/// line that shares it.
#[derive(Debug)]
pub(crate) struct PeriodScores<'a> {
    batch: &'a SimulationBatch,
    resolved: BTreeMap<PeriodDescriptor, Vec<ScoreAtPeriod>>,
}

impl<'a> PeriodScores<'a> {
    pub(crate) fn new(batch: &'a SimulationBatch) -> Self {
        Self {
            batch,
            resolved: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&mut self, period: &PeriodDescriptor) -> Result<&[ScoreAtPeriod]> {
        if !self.resolved.contains_key(period) {
            let scores = self
                .batch
                .games()
                .par_iter()
                .map(|game| score_at_period(game, period))
                .collect::<Result<Vec<_>>>()?;
            self.resolved.insert(*period, scores);
        }
        Ok(self.resolved.get(period).map(Vec::as_slice).unwrap_or(&[]))
    }
}

/// Aggregated counts for every configured market
#[derive(Debug, Clone, PartialEq)]
pub struct SimResults {
    pub sides: SidesCounts,
    pub totals: TotalsCounts,
    pub props: PropsCounts,
}

/// Aggregate a full batch against a stat capture configuration.
///
/// Total lines are augmented around the batch's mean total before counting.
pub fn calculate_sim_counts(
    batch: &SimulationBatch,
    lineups: &MatchupLineups,
    config: &StatCaptureConfig,
) -> Result<SimResults> {
    let started = Instant::now();
    let totals_config = totals::augment_total_lines(batch, config)?;

    let results = SimResults {
        sides: sides::calculate_sides_counts(batch, config)?,
        totals: totals::calculate_totals_counts(batch, &totals_config)?,
        props: props::calculate_props_counts(batch, lineups, config)?,
    };

    debug!(
        "Aggregated {} games for config {:?} in {:?}",
        batch.len(),
        config.name,
        started.elapsed()
    );

    Ok(results)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{
        MainMarket, MainMarketKind, MarketLineSpec, Player, PlayerPropLine, PlayerStat,
        ScoringOrderProp, TeamLineup,
    };

    fn lineups() -> MatchupLineups {
        let player = |id: u32, name: &str| Player {
            id,
            name: name.to_string(),
            position: None,
            batting_order: None,
        };
        MatchupLineups {
            away: TeamLineup {
                team_name: "Mets".to_string(),
                lineup: vec![player(AWAY_BATTER, "Away Batter")],
                starting_pitcher: player(AWAY_PITCHER, "Away Starter"),
                bullpen: vec![],
            },
            home: TeamLineup {
                team_name: "Pirates".to_string(),
                lineup: vec![player(HOME_BATTER, "Home Batter")],
                starting_pitcher: player(HOME_PITCHER, "Home Starter"),
                bullpen: vec![],
            },
        }
    }

    #[test]
    fn test_calculate_sim_counts_end_to_end() {
        let batch = uniform_batch(50, 5, 3);
        let config = StatCaptureConfig::new(
            "e2e",
            vec![
                MarketLineSpec::Main(MainMarket::new(
                    MainMarketKind::Total,
                    PeriodDescriptor::full_game(),
                    7.5,
                )),
                MarketLineSpec::PlayerProp(PlayerPropLine {
                    stat: PlayerStat::Strikeouts,
                    strike: 7.5,
                }),
                MarketLineSpec::ScoringOrder {
                    prop: ScoringOrderProp::FirstToScore,
                },
            ],
        );

        let results = calculate_sim_counts(&batch, &lineups(), &config).unwrap();

        // Moneyline is always present
        let home_ml = results.sides.home[&LineKey::new(PeriodDescriptor::full_game(), 0.0)];
        assert_eq!(home_ml.success, 50);

        // Mean total is 8, so 7..=9 were added around it
        let full = &results.totals.combined[&PeriodDescriptor::full_game()];
        assert!(full.contains_key(&OrderedFloat(7.5)));
        assert_eq!(full[&OrderedFloat(8.0)].over.push, 50);

        let scoring = results.props.scoring_order.unwrap();
        assert_eq!(scoring.away.first.unwrap().success, 50);
        assert!(scoring.away.last.is_none());

        // Home starter pitches every top half: one HR, eight strikeouts
        let home_starter = &results.props.player[&HOME_PITCHER];
        assert_eq!(
            home_starter.stats[&PlayerStat::Strikeouts][&OrderedFloat(7.5)].success,
            50
        );
    }

    #[test]
    fn test_period_scores_resolved_once_per_period() {
        let batch = uniform_batch(10, 2, 1);
        let mut scores = PeriodScores::new(&batch);
        let full = scores.get(&PeriodDescriptor::full_game()).unwrap().to_vec();
        assert_eq!(full.len(), 10);
        assert!(full.iter().all(|s| *s == ScoreAtPeriod::new(2, 1)));
        assert_eq!(scores.resolved.len(), 1);
        scores.get(&PeriodDescriptor::full_game()).unwrap();
        assert_eq!(scores.resolved.len(), 1);
    }
}
