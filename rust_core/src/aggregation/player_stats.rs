//! Player over/under props.
//!
//! A stat group only exists for a player who appeared in that role somewhere
//! in the batch. Once present, games in which the player did not appear
//! count as zero.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::Line;
use crate::models::{
    MatchupLineups, Player, PlayerId, PlayerRole, PlayerStat, SimulatedGame, SimulationBatch,
    StatCaptureConfig,
};
use crate::outcome::{count_outcomes, Direction, OutcomeCounts};

const STAT_COUNT: usize = PlayerStat::ALL.len();

/// A lineup player tagged with the team they play for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWithTeam {
    pub id: PlayerId,
    pub name: String,
    pub team_name: String,
}

impl PlayerWithTeam {
    pub fn new(player: &Player, team_name: &str) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            team_name: team_name.to_string(),
        }
    }
}

pub type StatLines = BTreeMap<Line, OutcomeCounts>;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPropsCounts {
    pub player_name: String,
    pub team_name: String,
    pub stats: BTreeMap<PlayerStat, StatLines>,
}

pub type AllPlayersPropsCounts = BTreeMap<PlayerId, PlayerPropsCounts>;

/// One player's line in one game
#[derive(Debug, Clone, Copy, Default)]
struct GameLine {
    batted: bool,
    pitched: bool,
    values: [u32; STAT_COUNT],
}

impl GameLine {
    fn appeared_as(&self, role: PlayerRole) -> bool {
        match role {
            PlayerRole::Batter => self.batted,
            PlayerRole::Pitcher => self.pitched,
        }
    }
}

type GameTally = FxHashMap<PlayerId, GameLine>;

/// Every player named in either lineup: starters, bullpens, then batters.
pub fn find_players(lineups: &MatchupLineups) -> Vec<PlayerWithTeam> {
    let mut seen = FxHashSet::default();
    let mut players = Vec::new();

    for team in [&lineups.away, &lineups.home] {
        let roster = std::iter::once(&team.starting_pitcher)
            .chain(team.bullpen.iter())
            .chain(team.lineup.iter());
        for player in roster {
            if seen.insert(player.id) {
                players.push(PlayerWithTeam::new(player, &team.team_name));
            }
        }
    }

    players
}

/// Configured strikes per stat, distinct and ascending
pub fn stat_lines(config: &StatCaptureConfig) -> BTreeMap<PlayerStat, Vec<Line>> {
    let mut lines: BTreeMap<PlayerStat, Vec<Line>> = BTreeMap::new();
    for prop in config.player_props() {
        lines
            .entry(prop.stat)
            .or_default()
            .push(OrderedFloat(prop.strike));
    }
    for strikes in lines.values_mut() {
        strikes.sort();
        strikes.dedup();
    }
    lines
}

fn tally_game(game: &SimulatedGame, players: &FxHashSet<PlayerId>) -> GameTally {
    let mut tally = GameTally::default();

    for play in game.plays() {
        for role in [PlayerRole::Batter, PlayerRole::Pitcher] {
            let id = role.player_on(play);
            if !players.contains(&id) {
                continue;
            }
            let line = tally.entry(id).or_default();
            match role {
                PlayerRole::Batter => line.batted = true,
                PlayerRole::Pitcher => line.pitched = true,
            }
            for stat in PlayerStat::ALL.iter().filter(|stat| stat.role() == role) {
                line.values[*stat as usize] += stat.definition().value(play);
            }
        }
    }

    tally
}

fn tally_batch(batch: &SimulationBatch, players: &FxHashSet<PlayerId>) -> Vec<GameTally> {
    batch
        .games()
        .par_iter()
        .map(|game| tally_game(game, players))
        .collect()
}

fn player_counts(
    player: &PlayerWithTeam,
    tallies: &[GameTally],
    lines: &BTreeMap<PlayerStat, Vec<Line>>,
) -> Option<PlayerPropsCounts> {
    let mut stats = BTreeMap::new();

    for (stat, strikes) in lines {
        let role = stat.role();
        let appeared = tallies.iter().any(|tally| {
            tally
                .get(&player.id)
                .is_some_and(|line| line.appeared_as(role))
        });
        if !appeared {
            continue;
        }

        let values: Vec<f64> = tallies
            .iter()
            .map(|tally| {
                tally
                    .get(&player.id)
                    .map_or(0, |line| line.values[*stat as usize]) as f64
            })
            .collect();

        let counts: StatLines = strikes
            .iter()
            .map(|&line| (line, count_outcomes(&values, line.0, Direction::Over)))
            .collect();
        stats.insert(*stat, counts);
    }

    if stats.is_empty() {
        return None;
    }
    Some(PlayerPropsCounts {
        player_name: player.name.clone(),
        team_name: player.team_name.clone(),
        stats,
    })
}

/// Over/under counts for one player, or `None` when the player never
/// appears in a role matching a configured stat.
pub fn find_player_stats(
    batch: &SimulationBatch,
    player: &PlayerWithTeam,
    config: &StatCaptureConfig,
) -> Option<PlayerPropsCounts> {
    let ids: FxHashSet<PlayerId> = std::iter::once(player.id).collect();
    let tallies = tally_batch(batch, &ids);
    player_counts(player, &tallies, &stat_lines(config))
}

/// Over/under counts for every lineup player that appears in the batch
pub fn find_all_player_stats(
    batch: &SimulationBatch,
    lineups: &MatchupLineups,
    config: &StatCaptureConfig,
) -> AllPlayersPropsCounts {
    let lines = stat_lines(config);
    if lines.is_empty() {
        return AllPlayersPropsCounts::new();
    }

    let players = find_players(lineups);
    let ids: FxHashSet<PlayerId> = players.iter().map(|player| player.id).collect();
    let tallies = tally_batch(batch, &ids);

    players
        .iter()
        .filter_map(|player| {
            player_counts(player, &tallies, &lines).map(|counts| (player.id, counts))
        })
        .collect()
}
