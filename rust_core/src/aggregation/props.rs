//! Team props: first-inning scoring and scoring order.

use rayon::prelude::*;

use super::player_stats::{find_all_player_stats, AllPlayersPropsCounts};
use crate::error::Result;
use crate::models::{
    MatchupLineups, ScoringOrderProp, SimulatedGame, SimulationBatch, StatCaptureConfig, TeamSide,
};
use crate::outcome::OutcomeCounts;
use crate::period::ensure_has_plays;

/// "Scored in the 1st inning" for each side and for either side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstInningCounts {
    pub away: OutcomeCounts,
    pub home: OutcomeCounts,
    pub overall: OutcomeCounts,
}

impl FirstInningCounts {
    pub fn side(&self, side: TeamSide) -> OutcomeCounts {
        match side {
            TeamSide::Away => self.away,
            TeamSide::Home => self.home,
        }
    }
}

/// First/last to score for one side. Absent when not requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamScoringOrderCounts {
    pub first: Option<OutcomeCounts>,
    pub last: Option<OutcomeCounts>,
}

impl TeamScoringOrderCounts {
    pub fn prop(&self, prop: ScoringOrderProp) -> Option<OutcomeCounts> {
        match prop {
            ScoringOrderProp::FirstToScore => self.first,
            ScoringOrderProp::LastToScore => self.last,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringOrderCounts {
    pub away: TeamScoringOrderCounts,
    pub home: TeamScoringOrderCounts,
}

impl ScoringOrderCounts {
    pub fn side(&self, side: TeamSide) -> &TeamScoringOrderCounts {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropsCounts {
    pub first_inning: FirstInningCounts,
    pub player: AllPlayersPropsCounts,
    pub scoring_order: Option<ScoringOrderCounts>,
}

pub fn calculate_props_counts(
    batch: &SimulationBatch,
    lineups: &MatchupLineups,
    config: &StatCaptureConfig,
) -> Result<PropsCounts> {
    Ok(PropsCounts {
        first_inning: calculate_first_inning_scores(batch)?,
        player: find_all_player_stats(batch, lineups, config),
        scoring_order: calculate_scoring_order_counts(batch, config)?,
    })
}

/// (away scored, home scored) in the 1st inning
fn first_inning_scorers(game: &SimulatedGame) -> Result<(bool, bool)> {
    ensure_has_plays(game)?;
    Ok(game
        .plays()
        .iter()
        .take_while(|play| play.inning == 1)
        .filter(|play| play.runs_on_play > 0)
        .fold((false, false), |(away, home), play| match play.batting_side() {
            TeamSide::Away => (true, home),
            TeamSide::Home => (away, true),
        }))
}

pub fn calculate_first_inning_scores(batch: &SimulationBatch) -> Result<FirstInningCounts> {
    let (away, home, either) = batch
        .games()
        .par_iter()
        .map(|game| -> Result<(u32, u32, u32)> {
            let (away, home) = first_inning_scorers(game)?;
            Ok((away as u32, home as u32, (away || home) as u32))
        })
        .try_reduce(|| (0, 0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1, a.2 + b.2)))?;

    let total = batch.len() as u32;
    Ok(FirstInningCounts {
        away: OutcomeCounts::from_successes(away, total),
        home: OutcomeCounts::from_successes(home, total),
        overall: OutcomeCounts::from_successes(either, total),
    })
}

fn scoring_side(game: &SimulatedGame, prop: ScoringOrderProp) -> Result<Option<TeamSide>> {
    ensure_has_plays(game)?;
    let mut scoring = game.plays().iter().filter(|play| play.runs_on_play > 0);
    let play = match prop {
        ScoringOrderProp::FirstToScore => scoring.next(),
        ScoringOrderProp::LastToScore => scoring.last(),
    };
    Ok(play.map(|play| play.batting_side()))
}

/// Reciprocal counts for one prop. A scoreless game fails for both sides.
fn scoring_order_for(
    batch: &SimulationBatch,
    prop: ScoringOrderProp,
) -> Result<(OutcomeCounts, OutcomeCounts)> {
    let (away, home) = batch
        .games()
        .par_iter()
        .map(|game| -> Result<(u32, u32)> {
            Ok(match scoring_side(game, prop)? {
                Some(TeamSide::Away) => (1, 0),
                Some(TeamSide::Home) => (0, 1),
                None => (0, 0),
            })
        })
        .try_reduce(|| (0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))?;

    let total = batch.len() as u32;
    Ok((
        OutcomeCounts::from_successes(away, total),
        OutcomeCounts::from_successes(home, total),
    ))
}

/// Scoring-order counts, or `None` when neither prop is configured
pub fn calculate_scoring_order_counts(
    batch: &SimulationBatch,
    config: &StatCaptureConfig,
) -> Result<Option<ScoringOrderCounts>> {
    let wants_first = config.requests_scoring_order(ScoringOrderProp::FirstToScore);
    let wants_last = config.requests_scoring_order(ScoringOrderProp::LastToScore);
    if !wants_first && !wants_last {
        return Ok(None);
    }

    let mut counts = ScoringOrderCounts::default();
    for (prop, wanted) in [
        (ScoringOrderProp::FirstToScore, wants_first),
        (ScoringOrderProp::LastToScore, wants_last),
    ] {
        if !wanted {
            continue;
        }
        let (away, home) = scoring_order_for(batch, prop)?;
        match prop {
            ScoringOrderProp::FirstToScore => {
                counts.away.first = Some(away);
                counts.home.first = Some(home);
            }
            ScoringOrderProp::LastToScore => {
                counts.away.last = Some(away);
                counts.home.last = Some(home);
            }
        }
    }
    Ok(Some(counts))
}
