//! Lean parameters fed to the simulator.

use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::models::{PlayerId, TeamSide};

/// Team-level leans are kept within +/- this value
pub const LEAN_LIMIT: f64 = 10.0;

/// One team's leans. Positive values strengthen the unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeans {
    #[serde(rename = "teamHitterLean")]
    pub hitter: f64,
    #[serde(rename = "teamPitcherLean")]
    pub pitcher: f64,
    #[serde(default, rename = "individualHitterLeans")]
    pub individual_hitter: BTreeMap<PlayerId, f64>,
    #[serde(default, rename = "individualPitcherLeans")]
    pub individual_pitcher: BTreeMap<PlayerId, f64>,
}

impl TeamLeans {
    pub fn new(hitter: f64, pitcher: f64) -> Self {
        Self {
            hitter: clamp_lean(hitter),
            pitcher: clamp_lean(pitcher),
            ..Self::default()
        }
    }

    /// Add a team adjustment; per-player leans are left as they are.
    pub fn apply(&mut self, adjustment: &TeamAdjustment) {
        self.hitter = clamp_lean(self.hitter + adjustment.hitter);
        self.pitcher = clamp_lean(self.pitcher + adjustment.pitcher);
    }
}

#[inline]
fn clamp_lean(value: f64) -> f64 {
    value.clamp(-LEAN_LIMIT, LEAN_LIMIT)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeanParameters {
    pub away: TeamLeans,
    pub home: TeamLeans,
}

impl LeanParameters {
    pub fn team(&self, side: TeamSide) -> &TeamLeans {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }

    pub fn apply(&mut self, adjustment: &LeanAdjustment) {
        self.away.apply(&adjustment.away);
        self.home.apply(&adjustment.home);
    }

    /// Same leans with team-level values pulled into range
    pub fn clamped(mut self) -> Self {
        for team in [&mut self.away, &mut self.home] {
            team.hitter = clamp_lean(team.hitter);
            team.pitcher = clamp_lean(team.pitcher);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAdjustment {
    pub hitter: f64,
    pub pitcher: f64,
}

impl Add for TeamAdjustment {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            hitter: self.hitter + other.hitter,
            pitcher: self.pitcher + other.pitcher,
        }
    }
}

/// Change to apply to both teams' leans after one iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeanAdjustment {
    pub away: TeamAdjustment,
    pub home: TeamAdjustment,
}

impl Add for LeanAdjustment {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            away: self.away + other.away,
            home: self.home + other.home,
        }
    }
}
