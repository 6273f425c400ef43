//! Sides (spread and moneyline) aggregation.
//!
//! For a side, margin = opponent score - own score at the period boundary.
//! The side covers when margin < line, so home -1.5 covers only when home
//! wins by two or more.

use std::collections::BTreeMap;

use super::{LineKey, PeriodScores};
use crate::error::Result;
use crate::models::{MainMarket, MainMarketKind, SimulationBatch, StatCaptureConfig, TeamSide};
use crate::outcome::{count_outcomes, Direction, OutcomeCounts};

pub type SideLines = BTreeMap<LineKey, OutcomeCounts>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidesCounts {
    pub home: SideLines,
    pub away: SideLines,
}

impl SidesCounts {
    pub fn side(&self, side: TeamSide) -> &SideLines {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

/// Spread counts for both sides.
///
/// The full-game moneyline is always evaluated. Positive strikes are also
/// evaluated at their negation.
pub fn calculate_sides_counts(
    batch: &SimulationBatch,
    config: &StatCaptureConfig,
) -> Result<SidesCounts> {
    let markets = with_moneyline(config);
    let mut scores = PeriodScores::new(batch);

    Ok(SidesCounts {
        home: single_side_counts(&mut scores, TeamSide::Home, &markets)?,
        away: single_side_counts(&mut scores, TeamSide::Away, &markets)?,
    })
}

fn with_moneyline(config: &StatCaptureConfig) -> Vec<MainMarket> {
    let mut markets: Vec<MainMarket> = config.main_markets(MainMarketKind::Spread).copied().collect();
    if !markets.iter().any(MainMarket::is_moneyline) {
        markets.push(MainMarket::moneyline());
    }
    markets
}

fn single_side_counts(
    scores: &mut PeriodScores<'_>,
    side: TeamSide,
    markets: &[MainMarket],
) -> Result<SideLines> {
    let mut results = SideLines::new();

    for market in markets {
        let margins: Vec<f64> = scores
            .get(&market.period)?
            .iter()
            .map(|score| score.margin_against(side) as f64)
            .collect();

        let mut lines = vec![market.strike];
        if market.strike > 0.0 {
            lines.push(-market.strike);
        }

        for line in lines {
            results.insert(
                LineKey::new(market.period, line),
                side_probability(&margins, line),
            );
        }
    }

    Ok(results)
}

#[inline]
fn side_probability(margins: &[f64], line: f64) -> OutcomeCounts {
    count_outcomes(margins, line, Direction::Under)
}
