//! Market taxonomy for stat capture
//!
//! The persisted "stat capture configuration" keeps markets as loosely typed,
//! string-keyed lists (`mainMarkets`, `propsOU`, `propsYN`). They are resolved
//! once, at load time, into the closed `MarketLineSpec` enumeration so that
//! aggregation never matches on strings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use super::{EventType, Play};
use crate::error::{Result, SimCoreError};
use crate::period::PeriodDescriptor;

// ============================================================================
// Main markets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MainMarketKind {
    Spread,
    Total,
    TeamTotal,
}

impl FromStr for MainMarketKind {
    type Err = SimCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Spread" => Ok(Self::Spread),
            "Total" => Ok(Self::Total),
            "TeamTotal" => Ok(Self::TeamTotal),
            other => Err(SimCoreError::InvalidConfig(format!(
                "unknown market type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MainMarket {
    pub kind: MainMarketKind,
    pub period: PeriodDescriptor,
    pub strike: f64,
}

impl MainMarket {
    pub fn new(kind: MainMarketKind, period: PeriodDescriptor, strike: f64) -> Self {
        Self {
            kind,
            period,
            strike,
        }
    }

    /// Full-game spread at 0 (the moneyline)
    pub fn moneyline() -> Self {
        Self::new(MainMarketKind::Spread, PeriodDescriptor::full_game(), 0.0)
    }

    pub fn is_moneyline(&self) -> bool {
        self.kind == MainMarketKind::Spread && self.period.is_full_game() && self.strike == 0.0
    }
}

// ============================================================================
// Player over/under props
// ============================================================================

/// Whose plays a stat is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

impl PlayerRole {
    #[inline]
    pub fn player_on(&self, play: &Play) -> super::PlayerId {
        match self {
            PlayerRole::Batter => play.batter_id,
            PlayerRole::Pitcher => play.pitcher_id,
        }
    }
}

/// Numeric play fields a stat can sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayField {
    Rbi,
}

impl PlayField {
    #[inline]
    pub fn read(&self, play: &Play) -> u32 {
        match self {
            PlayField::Rbi => play.rbi,
        }
    }
}

/// How a per-game stat value is built from a player's plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatDefinition {
    /// Count of plays whose event type is in the set
    EventCount(&'static [EventType]),
    /// Sum of a numeric play field
    ValueSum(PlayField),
}

impl StatDefinition {
    #[inline]
    pub fn value(&self, play: &Play) -> u32 {
        match self {
            StatDefinition::EventCount(events) => events.contains(&play.event_type) as u32,
            StatDefinition::ValueSum(field) => field.read(play),
        }
    }
}

const HIT_EVENTS: &[EventType] = &[
    EventType::Single,
    EventType::Double,
    EventType::Triple,
    EventType::HomeRun,
];
const HOME_RUN_EVENTS: &[EventType] = &[EventType::HomeRun];
const WALK_EVENTS: &[EventType] = &[EventType::Walk];
const STRIKEOUT_EVENTS: &[EventType] = &[EventType::Strikeout];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerStat {
    #[serde(rename = "H")]
    Hits,
    #[serde(rename = "HR")]
    HomeRuns,
    #[serde(rename = "RBI")]
    Rbi,
    #[serde(rename = "BB")]
    Walks,
    #[serde(rename = "Ks")]
    Strikeouts,
}

impl PlayerStat {
    pub const ALL: [PlayerStat; 5] = [
        PlayerStat::Hits,
        PlayerStat::HomeRuns,
        PlayerStat::Rbi,
        PlayerStat::Walks,
        PlayerStat::Strikeouts,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PlayerStat::Hits => "H",
            PlayerStat::HomeRuns => "HR",
            PlayerStat::Rbi => "RBI",
            PlayerStat::Walks => "BB",
            PlayerStat::Strikeouts => "Ks",
        }
    }

    pub fn role(&self) -> PlayerRole {
        match self {
            PlayerStat::Strikeouts => PlayerRole::Pitcher,
            _ => PlayerRole::Batter,
        }
    }

    pub fn definition(&self) -> StatDefinition {
        match self {
            PlayerStat::Hits => StatDefinition::EventCount(HIT_EVENTS),
            PlayerStat::HomeRuns => StatDefinition::EventCount(HOME_RUN_EVENTS),
            PlayerStat::Rbi => StatDefinition::ValueSum(PlayField::Rbi),
            PlayerStat::Walks => StatDefinition::EventCount(WALK_EVENTS),
            PlayerStat::Strikeouts => StatDefinition::EventCount(STRIKEOUT_EVENTS),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stat| stat.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropLine {
    pub stat: PlayerStat,
    pub strike: f64,
}

// ============================================================================
// Yes/no team props
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoringOrderProp {
    FirstToScore,
    LastToScore,
}

impl ScoringOrderProp {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "FirstToScore" => Some(Self::FirstToScore),
            "LastToScore" => Some(Self::LastToScore),
            _ => None,
        }
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// One configured line to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "market", rename_all = "snake_case")]
pub enum MarketLineSpec {
    Main(MainMarket),
    PlayerProp(PlayerPropLine),
    ScoringOrder { prop: ScoringOrderProp },
}

/// Stat capture configuration with every market resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatCaptureConfig {
    pub name: String,
    pub markets: Vec<MarketLineSpec>,
}

impl StatCaptureConfig {
    pub fn new(name: impl Into<String>, markets: Vec<MarketLineSpec>) -> Self {
        Self {
            name: name.into(),
            markets,
        }
    }

    /// Load and resolve a persisted configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: SavedConfiguration = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn push(&mut self, market: MarketLineSpec) {
        self.markets.push(market);
    }

    pub fn main_markets(&self, kind: MainMarketKind) -> impl Iterator<Item = &MainMarket> + '_ {
        self.markets.iter().filter_map(move |market| match market {
            MarketLineSpec::Main(main) if main.kind == kind => Some(main),
            _ => None,
        })
    }

    pub fn player_props(&self) -> impl Iterator<Item = &PlayerPropLine> + '_ {
        self.markets.iter().filter_map(|market| match market {
            MarketLineSpec::PlayerProp(prop) => Some(prop),
            _ => None,
        })
    }

    pub fn requests_scoring_order(&self, prop: ScoringOrderProp) -> bool {
        self.markets.iter().any(
            |market| matches!(market, MarketLineSpec::ScoringOrder { prop: p } if *p == prop),
        )
    }
}

// ============================================================================
// Persisted configuration shape
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMainMarket {
    pub market_type: String,
    pub period_type_code: String,
    pub period_number: u8,
    pub strike: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPropOU {
    pub prop: String,
    pub contestant_type: String,
    pub strike: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPropYN {
    #[serde(alias = "name")]
    pub prop: String,
    pub contestant_type: String,
}

/// Configuration as stored by the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    #[serde(default)]
    pub league: String,
    pub name: String,
    #[serde(default)]
    pub main_markets: Vec<SavedMainMarket>,
    #[serde(default, rename = "propsOU")]
    pub props_ou: Vec<SavedPropOU>,
    #[serde(default, rename = "propsYN")]
    pub props_yn: Vec<SavedPropYN>,
}

const TEAM_LEAGUE_CONTESTANT: &str = "TeamLeague";

impl TryFrom<SavedConfiguration> for StatCaptureConfig {
    type Error = SimCoreError;

    fn try_from(saved: SavedConfiguration) -> Result<Self> {
        let mut markets = Vec::with_capacity(
            saved.main_markets.len() + saved.props_ou.len() + saved.props_yn.len(),
        );

        for main in &saved.main_markets {
            let kind = main.market_type.parse::<MainMarketKind>()?;
            let period = PeriodDescriptor::parse(&main.period_type_code, main.period_number)?;
            let strike = main.strike.trim().parse::<f64>().map_err(|_| {
                SimCoreError::InvalidConfig(format!("invalid strike: {:?}", main.strike))
            })?;
            if !strike.is_finite() {
                return Err(SimCoreError::InvalidConfig(format!(
                    "invalid strike: {:?}",
                    main.strike
                )));
            }
            markets.push(MarketLineSpec::Main(MainMarket::new(kind, period, strike)));
        }

        for prop in &saved.props_ou {
            match PlayerStat::from_code(&prop.prop) {
                Some(stat) => markets.push(MarketLineSpec::PlayerProp(PlayerPropLine {
                    stat,
                    strike: prop.strike,
                })),
                None => warn!(
                    "Skipping unsupported over/under prop {:?} in config {:?}",
                    prop.prop, saved.name
                ),
            }
        }

        for prop in &saved.props_yn {
            match ScoringOrderProp::from_name(&prop.prop) {
                Some(order) if prop.contestant_type == TEAM_LEAGUE_CONTESTANT => {
                    markets.push(MarketLineSpec::ScoringOrder { prop: order })
                }
                _ => warn!(
                    "Skipping unsupported yes/no prop {:?} ({}) in config {:?}",
                    prop.prop, prop.contestant_type, saved.name
                ),
            }
        }

        Ok(Self {
            name: saved.name,
            markets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodTypeCode;

    const SAVED: &str = r#"{
        "league": "MLB",
        "name": "default",
        "mainMarkets": [
            { "marketType": "Spread", "periodTypeCode": "M", "periodNumber": 0, "strike": "1.5" },
            { "marketType": "Total", "periodTypeCode": "H", "periodNumber": 1, "strike": "4.5" },
            { "marketType": "TeamTotal", "periodTypeCode": "I", "periodNumber": 1, "strike": "0.5" }
        ],
        "propsOU": [
            { "prop": "H", "contestantType": "Individual", "strike": 0.5 },
            { "prop": "Ks", "contestantType": "Individual", "strike": 5.5 },
            { "prop": "TB", "contestantType": "Individual", "strike": 1.5 }
        ],
        "propsYN": [
            { "prop": "FirstToScore", "contestantType": "TeamLeague" },
            { "name": "LastToScore", "contestantType": "Individual" }
        ]
    }"#;

    #[test]
    fn test_saved_configuration_resolves_once() {
        let config = StatCaptureConfig::from_json(SAVED).unwrap();
        assert_eq!(config.name, "default");

        let spreads: Vec<_> = config.main_markets(MainMarketKind::Spread).collect();
        assert_eq!(spreads.len(), 1);
        assert_eq!(spreads[0].strike, 1.5);

        let totals: Vec<_> = config.main_markets(MainMarketKind::Total).collect();
        assert_eq!(totals[0].period, PeriodDescriptor::first_five());

        let team_totals: Vec<_> = config.main_markets(MainMarketKind::TeamTotal).collect();
        assert_eq!(team_totals[0].period.code, PeriodTypeCode::I);

        // "TB" is not a supported stat and is dropped
        let props: Vec<_> = config.player_props().map(|p| p.stat).collect();
        assert_eq!(props, vec![PlayerStat::Hits, PlayerStat::Strikeouts]);

        assert!(config.requests_scoring_order(ScoringOrderProp::FirstToScore));
        assert!(!config.requests_scoring_order(ScoringOrderProp::LastToScore));
    }

    #[test]
    fn test_unknown_market_type_rejected() {
        let json = r#"{ "name": "bad", "mainMarkets": [
            { "marketType": "Moneyline", "periodTypeCode": "M", "periodNumber": 0, "strike": "0" }
        ] }"#;
        assert!(matches!(
            StatCaptureConfig::from_json(json),
            Err(SimCoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_period_rejected_at_load() {
        let json = r#"{ "name": "bad", "mainMarkets": [
            { "marketType": "Total", "periodTypeCode": "H", "periodNumber": 2, "strike": "4.5" }
        ] }"#;
        assert!(matches!(
            StatCaptureConfig::from_json(json),
            Err(SimCoreError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_stat_definitions() {
        assert_eq!(PlayerStat::Strikeouts.role(), PlayerRole::Pitcher);
        assert_eq!(PlayerStat::Rbi.role(), PlayerRole::Batter);
        assert_eq!(PlayerStat::from_code("HR"), Some(PlayerStat::HomeRuns));
        assert!(matches!(
            PlayerStat::Rbi.definition(),
            StatDefinition::ValueSum(PlayField::Rbi)
        ));
    }

    #[test]
    fn test_moneyline_detection() {
        assert!(MainMarket::moneyline().is_moneyline());
        let spread = MainMarket::new(MainMarketKind::Spread, PeriodDescriptor::full_game(), 1.5);
        assert!(!spread.is_moneyline());
    }
}
