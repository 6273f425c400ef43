//! Totals aggregation (combined runs and team totals).

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::debug;

use super::{Line, PeriodScores};
use crate::error::Result;
use crate::models::{
    MainMarket, MainMarketKind, MarketLineSpec, SimulationBatch, StatCaptureConfig,
};
use crate::outcome::{count_outcomes, Direction, OutcomeCounts};
use crate::period::{score_at_period, PeriodDescriptor, ScoreScope};

/// Offsets (in runs) of the lines added around the batch's mean total
const MEAN_LINE_OFFSETS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverUnderCounts {
    pub over: OutcomeCounts,
    pub under: OutcomeCounts,
}

pub type TotalLines = BTreeMap<Line, OverUnderCounts>;
pub type PeriodTotals = BTreeMap<PeriodDescriptor, TotalLines>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalsCounts {
    pub combined: PeriodTotals,
    pub home: PeriodTotals,
    pub away: PeriodTotals,
}

impl TotalsCounts {
    pub fn scope(&self, scope: ScoreScope) -> &PeriodTotals {
        match scope {
            ScoreScope::Combined => &self.combined,
            ScoreScope::Home => &self.home,
            ScoreScope::Away => &self.away,
        }
    }
}

/// Over/under counts for every configured total and team total.
///
/// `Total` markets feed the combined scope, `TeamTotal` markets feed both
/// team scopes.
pub fn calculate_totals_counts(
    batch: &SimulationBatch,
    config: &StatCaptureConfig,
) -> Result<TotalsCounts> {
    let mut scores = PeriodScores::new(batch);

    Ok(TotalsCounts {
        combined: single_scope_totals(&mut scores, ScoreScope::Combined, config)?,
        home: single_scope_totals(&mut scores, ScoreScope::Home, config)?,
        away: single_scope_totals(&mut scores, ScoreScope::Away, config)?,
    })
}

fn single_scope_totals(
    scores: &mut PeriodScores<'_>,
    scope: ScoreScope,
    config: &StatCaptureConfig,
) -> Result<PeriodTotals> {
    let kind = match scope {
        ScoreScope::Combined => MainMarketKind::Total,
        ScoreScope::Home | ScoreScope::Away => MainMarketKind::TeamTotal,
    };

    let mut lines_by_period: BTreeMap<PeriodDescriptor, Vec<Line>> = BTreeMap::new();
    for market in config.main_markets(kind) {
        lines_by_period
            .entry(market.period)
            .or_default()
            .push(OrderedFloat(market.strike));
    }

    let mut results = PeriodTotals::new();
    for (period, mut lines) in lines_by_period {
        lines.sort();
        lines.dedup();

        let values: Vec<f64> = scores
            .get(&period)?
            .iter()
            .map(|score| scope.select(score) as f64)
            .collect();

        let period_lines = results.entry(period).or_default();
        for line in lines {
            period_lines.insert(
                line,
                OverUnderCounts {
                    over: count_outcomes(&values, line.0, Direction::Over),
                    under: count_outcomes(&values, line.0, Direction::Under),
                },
            );
        }
    }

    Ok(results)
}

/// Mean full-game combined runs across the batch
pub fn mean_total_runs(batch: &SimulationBatch) -> Result<Option<f64>> {
    if batch.is_empty() {
        return Ok(None);
    }
    let full_game = PeriodDescriptor::full_game();
    let runs: u64 = batch
        .games()
        .par_iter()
        .map(|game| score_at_period(game, &full_game).map(|score| score.combined() as u64))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sum();
    Ok(Some(runs as f64 / batch.len() as f64))
}

/// Copy of `config` with five full-game total lines centred on the batch's
/// mean total (rounded to the nearest half run).
///
/// Lines already in the config are not deduplicated here; duplicate strikes
/// collapse onto the same key when counted.
pub fn augment_total_lines(
    batch: &SimulationBatch,
    config: &StatCaptureConfig,
) -> Result<StatCaptureConfig> {
    let mut augmented = config.clone();
    let Some(mean) = mean_total_runs(batch)? else {
        debug!("Empty batch, skipping total line augmentation");
        return Ok(augmented);
    };

    let base_total = (mean * 2.0).round() / 2.0;
    for offset in MEAN_LINE_OFFSETS {
        augmented.push(MarketLineSpec::Main(MainMarket::new(
            MainMarketKind::Total,
            PeriodDescriptor::full_game(),
            base_total + offset,
        )));
    }

    debug!(
        "Mean total {:.3} runs, added full-game lines around {}",
        mean, base_total
    );
    Ok(augmented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::test_support::{game, uniform_batch};
    use crate::models::SimulatedGame;
    use proptest::prelude::*;

    fn totals_config(markets: &[(MainMarketKind, PeriodDescriptor, f64)]) -> StatCaptureConfig {
        StatCaptureConfig::new(
            "totals",
            markets
                .iter()
                .map(|&(kind, period, strike)| {
                    MarketLineSpec::Main(MainMarket::new(kind, period, strike))
                })
                .collect(),
        )
    }

    #[test]
    fn test_all_five_three_games_against_seven_and_a_half_and_eight() {
        let n = 25;
        let batch = uniform_batch(n, 5, 3);
        let full = PeriodDescriptor::full_game();
        let config = totals_config(&[
            (MainMarketKind::Total, full, 7.5),
            (MainMarketKind::Total, full, 8.5),
        ]);
        let totals = calculate_totals_counts(&batch, &config).unwrap();
        let lines = &totals.combined[&full];

        assert_eq!(
            lines[&OrderedFloat(7.5)].over,
            OutcomeCounts {
                success: 25,
                failure: 0,
                push: 0,
                total: 25
            }
        );
        assert_eq!(
            lines[&OrderedFloat(8.5)].over,
            OutcomeCounts {
                success: 0,
                failure: 25,
                push: 0,
                total: 25
            }
        );
        assert_eq!(lines[&OrderedFloat(8.5)].under.success, 25);
    }

    #[test]
    fn test_team_totals_split_by_side() {
        let batch = uniform_batch(10, 5, 3);
        let full = PeriodDescriptor::full_game();
        let config = totals_config(&[(MainMarketKind::TeamTotal, full, 3.5)]);
        let totals = calculate_totals_counts(&batch, &config).unwrap();

        assert_eq!(totals.home[&full][&OrderedFloat(3.5)].over.success, 10);
        assert_eq!(totals.away[&full][&OrderedFloat(3.5)].under.success, 10);
        assert!(totals.combined.is_empty());
    }

    #[test]
    fn test_single_inning_totals() {
        let batch = uniform_batch(10, 5, 3);
        let first = PeriodDescriptor::inning(1).unwrap();
        let sixth = PeriodDescriptor::inning(6).unwrap();
        let config = totals_config(&[
            (MainMarketKind::Total, first, 0.5),
            (MainMarketKind::Total, sixth, 4.5),
        ]);
        let totals = calculate_totals_counts(&batch, &config).unwrap();
        assert_eq!(totals.combined[&first][&OrderedFloat(0.5)].over.success, 10);
        assert_eq!(totals.combined[&sixth][&OrderedFloat(4.5)].over.success, 10);
    }

    #[test]
    fn test_single_inning_total_rejects_empty_game() {
        let batch: SimulationBatch = vec![game(5, 3), SimulatedGame::default()]
            .into_iter()
            .collect();
        let config = totals_config(&[(MainMarketKind::Total, PeriodDescriptor::inning(1).unwrap(), 0.5)]);
        assert!(matches!(
            calculate_totals_counts(&batch, &config),
            Err(crate::error::SimCoreError::MalformedBatch(_))
        ));
    }

    #[test]
    fn test_augmentation_centres_on_mean_and_keeps_duplicates() {
        // Mean total of 8
        let batch = uniform_batch(4, 5, 3);
        let full = PeriodDescriptor::full_game();
        let config = totals_config(&[(MainMarketKind::Total, full, 8.0)]);

        let augmented = augment_total_lines(&batch, &config).unwrap();
        let strikes: Vec<f64> = augmented
            .main_markets(MainMarketKind::Total)
            .map(|m| m.strike)
            .collect();
        assert_eq!(strikes, vec![8.0, 7.0, 7.5, 8.0, 8.5, 9.0]);

        let totals = calculate_totals_counts(&batch, &augmented).unwrap();
        assert_eq!(totals.combined[&full].len(), 5);
    }

    #[test]
    fn test_augmentation_rounds_to_nearest_half() {
        // Totals 8, 9, 9 -> mean 8.667 -> 8.5
        let batch: SimulationBatch = vec![game(5, 3), game(5, 4), game(6, 3)].into_iter().collect();
        assert!((mean_total_runs(&batch).unwrap().unwrap() - 26.0 / 3.0).abs() < 1e-9);

        let augmented = augment_total_lines(&batch, &StatCaptureConfig::default()).unwrap();
        let strikes: Vec<f64> = augmented
            .main_markets(MainMarketKind::Total)
            .map(|m| m.strike)
            .collect();
        assert_eq!(strikes, vec![7.5, 8.0, 8.5, 9.0, 9.5]);
    }

    #[test]
    fn test_empty_batch_skips_augmentation() {
        let augmented =
            augment_total_lines(&SimulationBatch::default(), &StatCaptureConfig::default())
                .unwrap();
        assert!(augmented.markets.is_empty());
    }

    proptest! {
        #[test]
        fn prop_over_count_non_increasing_in_line(
            scores in prop::collection::vec((0u32..10, 0u32..10), 1..50),
        ) {
            let batch: SimulationBatch = scores.iter().map(|&(h, a)| game(h, a)).collect();
            let full = PeriodDescriptor::full_game();
            let markets: Vec<_> = (0..40)
                .map(|half_runs| (MainMarketKind::Total, full, half_runs as f64 / 2.0))
                .collect();
            let totals = calculate_totals_counts(&batch, &totals_config(&markets)).unwrap();

            let mut previous = u32::MAX;
            for counts in totals.combined[&full].values() {
                prop_assert!(counts.over.success <= previous);
                prop_assert!(counts.over.is_consistent());
                prop_assert_eq!(counts.over.total as usize, scores.len());
                previous = counts.over.success;
            }
        }
    }
}
