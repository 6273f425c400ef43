//! Period resolution over simulated games.
//!
//! A period is a (type code, number) pair:
//! - `M0` - full game
//! - `H1` - first five innings
//! - `In` - runs scored within inning `n` only
//!
//! Anything else is rejected with `InvalidPeriod`.

use crate::error::{Result, SimCoreError};
use crate::models::{Play, ScoreAtPeriod, SimulatedGame, TeamSide};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last inning covered by the `H1` ("first five") period
pub const FIRST_FIVE_END_INNING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodTypeCode {
    /// Match
    M,
    /// Half (first five innings)
    H,
    /// Single inning
    I,
}

impl PeriodTypeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodTypeCode::M => "M",
            PeriodTypeCode::H => "H",
            PeriodTypeCode::I => "I",
        }
    }
}

impl FromStr for PeriodTypeCode {
    type Err = SimCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "M" => Ok(PeriodTypeCode::M),
            "H" => Ok(PeriodTypeCode::H),
            "I" => Ok(PeriodTypeCode::I),
            other => Err(SimCoreError::invalid_period(other, 0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDescriptor {
    pub code: PeriodTypeCode,
    pub number: u8,
}

impl PeriodDescriptor {
    /// Build a descriptor, rejecting combinations with no game-time window
    pub fn new(code: PeriodTypeCode, number: u8) -> Result<Self> {
        let period = Self { code, number };
        period.validate()?;
        Ok(period)
    }

    /// Parse the persisted (type code, number) form
    pub fn parse(code: &str, number: u8) -> Result<Self> {
        let code = code
            .parse::<PeriodTypeCode>()
            .map_err(|_| SimCoreError::invalid_period(code, number))?;
        Self::new(code, number)
    }

    pub const fn full_game() -> Self {
        Self {
            code: PeriodTypeCode::M,
            number: 0,
        }
    }

    pub const fn first_five() -> Self {
        Self {
            code: PeriodTypeCode::H,
            number: 1,
        }
    }

    pub fn inning(number: u8) -> Result<Self> {
        Self::new(PeriodTypeCode::I, number)
    }

    pub fn is_full_game(&self) -> bool {
        *self == Self::full_game()
    }

    pub fn validate(&self) -> Result<()> {
        let valid = match self.code {
            PeriodTypeCode::M => self.number == 0,
            PeriodTypeCode::H => self.number == 1,
            PeriodTypeCode::I => self.number >= 1,
        };
        if valid {
            Ok(())
        } else {
            Err(SimCoreError::invalid_period(self.code.as_str(), self.number))
        }
    }

    /// Display key used by the dashboard ("fullGame", "firstFive", "I3")
    pub fn key(&self) -> String {
        match (self.code, self.number) {
            (PeriodTypeCode::M, _) => "fullGame".to_string(),
            (PeriodTypeCode::H, 1) => "firstFive".to_string(),
            (code, number) => format!("{}{}", code.as_str(), number),
        }
    }
}

impl fmt::Display for PeriodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code.as_str(), self.number)
    }
}

/// Score of `game` at the boundary of `period`.
///
/// A game with no plays is `MalformedBatch` for every period, never 0-0.
pub fn score_at_period(game: &SimulatedGame, period: &PeriodDescriptor) -> Result<ScoreAtPeriod> {
    period.validate()?;
    ensure_has_plays(game)?;
    match (period.code, period.number) {
        (PeriodTypeCode::M, 0) => full_game_score(game),
        (PeriodTypeCode::H, 1) => score_through_inning(game, FIRST_FIVE_END_INNING),
        (PeriodTypeCode::I, n) if n >= 1 => Ok(runs_in_inning(game.plays(), n)),
        (code, number) => Err(SimCoreError::invalid_period(code.as_str(), number)),
    }
}

/// Combined, home-only or away-only runs at the period boundary.
pub fn score_for_scope(
    game: &SimulatedGame,
    scope: ScoreScope,
    period: &PeriodDescriptor,
) -> Result<u32> {
    let score = score_at_period(game, period)?;
    Ok(scope.select(&score))
}

/// Which runs a total counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScope {
    Combined,
    Home,
    Away,
}

impl ScoreScope {
    pub fn select(&self, score: &ScoreAtPeriod) -> u32 {
        match self {
            ScoreScope::Combined => score.combined(),
            ScoreScope::Home => score.home_score,
            ScoreScope::Away => score.away_score,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreScope::Combined => "combined",
            ScoreScope::Home => "home",
            ScoreScope::Away => "away",
        }
    }
}

impl From<TeamSide> for ScoreScope {
    fn from(side: TeamSide) -> Self {
        match side {
            TeamSide::Away => ScoreScope::Away,
            TeamSide::Home => ScoreScope::Home,
        }
    }
}

/// Rejects a game with no plays
pub fn ensure_has_plays(game: &SimulatedGame) -> Result<()> {
    if game.is_empty() {
        return Err(SimCoreError::MalformedBatch("game has no plays".to_string()));
    }
    Ok(())
}

fn full_game_score(game: &SimulatedGame) -> Result<ScoreAtPeriod> {
    game.last_play()
        .map(Play::score_after)
        .ok_or_else(|| SimCoreError::MalformedBatch("game has no plays".to_string()))
}

fn score_through_inning(game: &SimulatedGame, end_inning: u8) -> Result<ScoreAtPeriod> {
    game.plays()
        .iter()
        .rev()
        .find(|play| play.inning <= end_inning)
        .map(Play::score_after)
        .ok_or_else(|| {
            SimCoreError::MalformedBatch(format!(
                "no play found at or before inning {}",
                end_inning
            ))
        })
}

fn runs_in_inning(plays: &[Play], inning: u8) -> ScoreAtPeriod {
    plays
        .iter()
        .filter(|play| play.inning == inning)
        .fold(ScoreAtPeriod::default(), |mut score, play| {
            match play.batting_side() {
                TeamSide::Away => score.away_score += play.runs_on_play,
                TeamSide::Home => score.home_score += play.runs_on_play,
            }
            score
        })
}
