// Shared models for simulated games and lineups
use serde::{Deserialize, Serialize};

pub mod market_type;

pub use market_type::*;

/// Player identifier (MLBAM id)
pub type PlayerId = u32;

// ============================================================================
// Sides & Innings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub fn opponent(&self) -> TeamSide {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Away => "away",
            TeamSide::Home => "home",
        }
    }
}

/// Half of an inning. The away team bats in the top half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfInning {
    Top,
    Bottom,
}

impl HalfInning {
    /// Side at bat during this half
    #[inline]
    pub fn batting_side(&self) -> TeamSide {
        match self {
            HalfInning::Top => TeamSide::Away,
            HalfInning::Bottom => TeamSide::Home,
        }
    }
}

// ============================================================================
// Plays
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "K")]
    Strikeout,
    #[serde(rename = "BB")]
    Walk,
    #[serde(rename = "1B")]
    Single,
    #[serde(rename = "2B")]
    Double,
    #[serde(rename = "3B")]
    Triple,
    #[serde(rename = "HR")]
    HomeRun,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "SB")]
    StolenBase,
    #[serde(rename = "CS")]
    CaughtStealing,
}

/// One discrete event within a simulated game.
///
/// `home_score`/`away_score` are the cumulative score *before* this play's
/// runs are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub inning: u8,
    pub half: HalfInning,
    #[serde(rename = "batterID")]
    pub batter_id: PlayerId,
    #[serde(rename = "pitcherID")]
    pub pitcher_id: PlayerId,
    pub event_type: EventType,
    pub runs_on_play: u32,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default)]
    pub rbi: u32,
}

impl Play {
    #[inline]
    pub fn batting_side(&self) -> TeamSide {
        self.half.batting_side()
    }

    /// Score once this play's runs have been credited to the batting side
    #[inline]
    pub fn score_after(&self) -> ScoreAtPeriod {
        match self.half {
            HalfInning::Top => ScoreAtPeriod {
                home_score: self.home_score,
                away_score: self.away_score + self.runs_on_play,
            },
            HalfInning::Bottom => ScoreAtPeriod {
                home_score: self.home_score + self.runs_on_play,
                away_score: self.away_score,
            },
        }
    }
}

/// Score at a period boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAtPeriod {
    pub home_score: u32,
    pub away_score: u32,
}

impl ScoreAtPeriod {
    pub fn new(home_score: u32, away_score: u32) -> Self {
        Self {
            home_score,
            away_score,
        }
    }

    pub fn combined(&self) -> u32 {
        self.home_score + self.away_score
    }

    pub fn for_side(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Away => self.away_score,
            TeamSide::Home => self.home_score,
        }
    }

    /// Opponent score minus own score
    pub fn margin_against(&self, side: TeamSide) -> i64 {
        self.for_side(side.opponent()) as i64 - self.for_side(side) as i64
    }
}

// ============================================================================
// Games & Batches
// ============================================================================

/// One full, independently sampled game. Play order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulatedGame {
    plays: Vec<Play>,
}

impl SimulatedGame {
    pub fn new(plays: Vec<Play>) -> Self {
        Self { plays }
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn last_play(&self) -> Option<&Play> {
        self.plays.last()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}

/// All games produced under one fixed set of lineups and leans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationBatch {
    games: Vec<SimulatedGame>,
}

impl SimulationBatch {
    pub fn new(games: Vec<SimulatedGame>) -> Self {
        Self { games }
    }

    pub fn games(&self) -> &[SimulatedGame] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl FromIterator<SimulatedGame> for SimulationBatch {
    fn from_iter<I: IntoIterator<Item = SimulatedGame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Lineups
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub batting_order: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub team_name: String,
    /// Players in batting order
    pub lineup: Vec<Player>,
    pub starting_pitcher: Player,
    #[serde(default)]
    pub bullpen: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupLineups {
    pub away: TeamLineup,
    pub home: TeamLineup,
}

impl MatchupLineups {
    pub fn team(&self, side: TeamSide) -> &TeamLineup {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(half: HalfInning, runs: u32, home: u32, away: u32) -> Play {
        Play {
            inning: 1,
            half,
            batter_id: 1,
            pitcher_id: 2,
            event_type: EventType::HomeRun,
            runs_on_play: runs,
            home_score: home,
            away_score: away,
            rbi: runs,
        }
    }

    #[test]
    fn test_score_after_credits_batting_side() {
        let top = play(HalfInning::Top, 2, 1, 3);
        assert_eq!(top.score_after(), ScoreAtPeriod::new(1, 5));

        let bottom = play(HalfInning::Bottom, 2, 1, 3);
        assert_eq!(bottom.score_after(), ScoreAtPeriod::new(3, 3));
    }

    #[test]
    fn test_margin_against() {
        let score = ScoreAtPeriod::new(5, 3);
        assert_eq!(score.margin_against(TeamSide::Home), -2);
        assert_eq!(score.margin_against(TeamSide::Away), 2);
    }

    #[test]
    fn test_play_deserializes_from_simulator_shape() {
        let json = r#"{
            "inning": 3,
            "half": "bottom",
            "batterID": 660271,
            "pitcherID": 543037,
            "eventType": "2B",
            "runsOnPlay": 1,
            "homeScore": 2,
            "awayScore": 4,
            "rbi": 1
        }"#;
        let play: Play = serde_json::from_str(json).unwrap();
        assert_eq!(play.event_type, EventType::Double);
        assert_eq!(play.batting_side(), TeamSide::Home);
    }
}
