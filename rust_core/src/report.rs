//! Flat, serializable views of aggregated counts.
//!
//! Aggregation results are keyed by structured map keys; hosts that display
//! or store them want rows. Each row carries the raw counts plus the
//! refund-policy probability, its 95% margin of error and the fair American
//! price (absent when the probability is 0 or 1).

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::aggregation::{LineKey, SimResults};
use crate::models::{PlayerId, PlayerStat, ScoringOrderProp, TeamSide};
use crate::odds::{
    counts_to_american_odds, counts_to_probability, margin_of_error, probability_to_american_odds,
    PushPolicy,
};
use crate::outcome::OutcomeCounts;
use crate::period::{PeriodDescriptor, ScoreScope};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedOutcome {
    #[serde(flatten)]
    pub counts: OutcomeCounts,
    pub probability: f64,
    pub margin_of_error: f64,
    pub fair_odds: Option<f64>,
}

impl PricedOutcome {
    pub fn new(counts: OutcomeCounts, policy: PushPolicy) -> Self {
        let probability = counts_to_probability(&counts, policy);
        Self {
            counts,
            probability,
            margin_of_error: margin_of_error(counts.total, probability),
            fair_odds: counts_to_american_odds(&counts, policy).ok(),
        }
    }
}

impl From<OutcomeCounts> for PricedOutcome {
    fn from(counts: OutcomeCounts) -> Self {
        Self::new(counts, PushPolicy::Refund)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRow {
    pub side: TeamSide,
    pub period: String,
    pub line: f64,
    #[serde(flatten)]
    pub outcome: PricedOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRow {
    pub scope: ScoreScope,
    pub period: String,
    pub line: f64,
    pub over: PricedOutcome,
    pub under: PricedOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstInningRow {
    /// "away", "home" or "either"
    pub team: String,
    #[serde(flatten)]
    pub outcome: PricedOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOrderRow {
    pub side: TeamSide,
    pub prop: ScoringOrderProp,
    #[serde(flatten)]
    pub outcome: PricedOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPropRow {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub stat: PlayerStat,
    pub line: f64,
    pub over: PricedOutcome,
}

/// Headline numbers for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub favorite: TeamSide,
    pub favorite_odds: f64,
    /// Full-game total whose over is closest to a coin flip
    pub total_line: f64,
    pub over_odds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimReport {
    pub sides: Vec<SideRow>,
    pub totals: Vec<TotalRow>,
    pub first_inning: Vec<FirstInningRow>,
    pub scoring_order: Vec<ScoringOrderRow>,
    pub player_props: Vec<PlayerPropRow>,
    pub summary: Option<ResultsSummary>,
}

pub fn build_report(results: &SimResults) -> SimReport {
    SimReport {
        sides: side_rows(results),
        totals: total_rows(results),
        first_inning: first_inning_rows(results),
        scoring_order: scoring_order_rows(results),
        player_props: player_prop_rows(results),
        summary: results_summary(results),
    }
}

fn side_rows(results: &SimResults) -> Vec<SideRow> {
    [TeamSide::Away, TeamSide::Home]
        .into_iter()
        .flat_map(|side| {
            results
                .sides
                .side(side)
                .iter()
                .map(move |(key, counts)| SideRow {
                    side,
                    period: key.period.key(),
                    line: key.line.0,
                    outcome: (*counts).into(),
                })
        })
        .collect()
}

fn total_rows(results: &SimResults) -> Vec<TotalRow> {
    let mut rows = Vec::new();
    for scope in [ScoreScope::Combined, ScoreScope::Away, ScoreScope::Home] {
        for (period, lines) in results.totals.scope(scope) {
            for (line, counts) in lines {
                rows.push(TotalRow {
                    scope,
                    period: period.key(),
                    line: line.0,
                    over: counts.over.into(),
                    under: counts.under.into(),
                });
            }
        }
    }
    rows
}

fn first_inning_rows(results: &SimResults) -> Vec<FirstInningRow> {
    let first_inning = &results.props.first_inning;
    [
        ("away", first_inning.away),
        ("home", first_inning.home),
        ("either", first_inning.overall),
    ]
    .into_iter()
    .map(|(team, counts)| FirstInningRow {
        team: team.to_string(),
        outcome: counts.into(),
    })
    .collect()
}

fn scoring_order_rows(results: &SimResults) -> Vec<ScoringOrderRow> {
    let Some(scoring_order) = &results.props.scoring_order else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for side in [TeamSide::Away, TeamSide::Home] {
        for prop in [ScoringOrderProp::FirstToScore, ScoringOrderProp::LastToScore] {
            if let Some(counts) = scoring_order.side(side).prop(prop) {
                rows.push(ScoringOrderRow {
                    side,
                    prop,
                    outcome: counts.into(),
                });
            }
        }
    }
    rows
}

fn player_prop_rows(results: &SimResults) -> Vec<PlayerPropRow> {
    let mut rows = Vec::new();
    for (id, player) in &results.props.player {
        for (stat, lines) in &player.stats {
            for (line, counts) in lines {
                rows.push(PlayerPropRow {
                    player_id: *id,
                    player_name: player.player_name.clone(),
                    team_name: player.team_name.clone(),
                    stat: *stat,
                    line: line.0,
                    over: (*counts).into(),
                });
            }
        }
    }
    rows
}

/// Favourite's fair moneyline and the most balanced full-game total.
///
/// `None` if the batch was empty or every total line is one-sided.
pub fn results_summary(results: &SimResults) -> Option<ResultsSummary> {
    let moneyline = LineKey::new(PeriodDescriptor::full_game(), 0.0);
    let home_win = counts_to_probability(results.sides.home.get(&moneyline)?, PushPolicy::Refund);
    let away_win = counts_to_probability(results.sides.away.get(&moneyline)?, PushPolicy::Refund);
    let (favorite, favorite_win) = if home_win >= away_win {
        (TeamSide::Home, home_win)
    } else {
        (TeamSide::Away, away_win)
    };
    let favorite_odds = probability_to_american_odds(favorite_win).ok()?;

    let (total_line, over_odds) = results
        .totals
        .combined
        .get(&PeriodDescriptor::full_game())?
        .iter()
        .filter_map(|(line, counts)| {
            let over = counts_to_probability(&counts.over, PushPolicy::Refund);
            probability_to_american_odds(over)
                .ok()
                .map(|odds| (line.0, over, odds))
        })
        .min_by_key(|(_, over, _)| OrderedFloat((over - 0.5).abs()))
        .map(|(line, _, odds)| (line, odds))?;

    Some(ResultsSummary {
        favorite,
        favorite_odds,
        total_line,
        over_odds,
    })
}

/// Probability each side wins a three-game series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesProbabilities {
    pub home: f64,
    pub away: f64,
}

/// Home team wins at least two of three games.
pub fn series_win_probability(home_win: [f64; 3]) -> SeriesProbabilities {
    let [p1, p2, p3] = home_win;
    let home = p1 * p2 * p3
        + p1 * p2 * (1.0 - p3)
        + p1 * (1.0 - p2) * p3
        + (1.0 - p1) * p2 * p3;
    SeriesProbabilities {
        home,
        away: 1.0 - home,
    }
}

/// Series probabilities from three per-game results, using each game's
/// refund-policy home moneyline probability.
///
/// `None` if any game has no decided simulations.
pub fn series_from_results(games: [&SimResults; 3]) -> Option<SeriesProbabilities> {
    let moneyline = LineKey::new(PeriodDescriptor::full_game(), 0.0);
    let mut home_win = [0.0; 3];
    for (slot, results) in home_win.iter_mut().zip(games) {
        let counts = results.sides.home.get(&moneyline)?;
        if counts.success + counts.failure == 0 {
            return None;
        }
        *slot = counts_to_probability(counts, PushPolicy::Refund);
    }
    Some(series_win_probability(home_win))
}
