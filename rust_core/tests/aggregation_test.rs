//! Batch aggregation through the public API, from saved configuration JSON
//! to report rows.

use ordered_float::OrderedFloat;
use simdash_rust_core::aggregation::{calculate_sim_counts, LineKey};
use simdash_rust_core::models::{
    EventType, HalfInning, MatchupLineups, Play, Player, PlayerStat, SimulatedGame,
    SimulationBatch, StatCaptureConfig, TeamLineup, TeamSide,
};
use simdash_rust_core::outcome::OutcomeCounts;
use simdash_rust_core::period::{score_at_period, PeriodDescriptor};
use simdash_rust_core::report::build_report;
use simdash_rust_core::SimCoreError;

const N: u32 = 200;
const AWAY_LEADOFF: u32 = 592450;
const HOME_STARTER: u32 = 543037;

const SAVED_CONFIG: &str = r#"{
    "league": "MLB",
    "name": "standard",
    "mainMarkets": [
        { "marketType": "Spread", "periodTypeCode": "M", "periodNumber": 0, "strike": "1.5" },
        { "marketType": "Total", "periodTypeCode": "M", "periodNumber": 0, "strike": "7.5" },
        { "marketType": "Total", "periodTypeCode": "M", "periodNumber": 0, "strike": "8" },
        { "marketType": "Total", "periodTypeCode": "H", "periodNumber": 1, "strike": "4.5" },
        { "marketType": "TeamTotal", "periodTypeCode": "M", "periodNumber": 0, "strike": "4.5" }
    ],
    "propsOU": [
        { "prop": "H", "contestantType": "Individual", "strike": 0.5 },
        { "prop": "Ks", "contestantType": "Individual", "strike": 2.5 }
    ],
    "propsYN": [
        { "prop": "FirstToScore", "contestantType": "TeamLeague" },
        { "prop": "LastToScore", "contestantType": "TeamLeague" }
    ]
}"#;

fn player(id: u32, name: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
        position: None,
        batting_order: Some(1),
    }
}

fn lineups() -> MatchupLineups {
    MatchupLineups {
        away: TeamLineup {
            team_name: "Yankees".to_string(),
            lineup: vec![player(AWAY_LEADOFF, "Away Leadoff")],
            starting_pitcher: player(1, "Away Starter"),
            bullpen: vec![player(2, "Unused Reliever")],
        },
        home: TeamLineup {
            team_name: "Red Sox".to_string(),
            lineup: vec![player(3, "Home Leadoff")],
            starting_pitcher: player(HOME_STARTER, "Home Starter"),
            bullpen: vec![],
        },
    }
}

/// Final 5-3 home: away leadoff homers for 3 in the 2nd, home scores 5 in
/// the 7th, home starter strikes out three.
fn five_three_game() -> SimulatedGame {
    let mut plays = Vec::new();
    let (mut home, mut away) = (0, 0);
    for inning in 1..=9u8 {
        for half in [HalfInning::Top, HalfInning::Bottom] {
            let (batter_id, pitcher_id) = match half {
                HalfInning::Top => (AWAY_LEADOFF, HOME_STARTER),
                HalfInning::Bottom => (3, 1),
            };
            let runs = match (inning, half) {
                (2, HalfInning::Top) => 3,
                (7, HalfInning::Bottom) => 5,
                _ => 0,
            };
            let event_type = match (runs, half, inning) {
                (r, _, _) if r > 0 => EventType::HomeRun,
                (_, HalfInning::Top, 1..=4) => EventType::Strikeout,
                _ => EventType::Out,
            };
            plays.push(Play {
                inning,
                half,
                batter_id,
                pitcher_id,
                event_type,
                runs_on_play: runs,
                home_score: home,
                away_score: away,
                rbi: runs,
            });
            match half {
                HalfInning::Top => away += runs,
                HalfInning::Bottom => home += runs,
            }
        }
    }
    SimulatedGame::new(plays)
}

fn batch() -> SimulationBatch {
    (0..N).map(|_| five_three_game()).collect()
}

#[test]
fn test_all_five_three_home_batch() {
    let config = StatCaptureConfig::from_json(SAVED_CONFIG).unwrap();
    let results = calculate_sim_counts(&batch(), &lineups(), &config).unwrap();
    let full = PeriodDescriptor::full_game();

    // Home spread 0 covers every game
    assert_eq!(
        results.sides.home[&LineKey::new(full, 0.0)],
        OutcomeCounts {
            success: N,
            failure: 0,
            push: 0,
            total: N
        }
    );

    let totals = &results.totals.combined[&full];
    assert_eq!(
        totals[&OrderedFloat(7.5)].over,
        OutcomeCounts {
            success: N,
            failure: 0,
            push: 0,
            total: N
        }
    );
    // Eight runs on a line of 8 lands on the line
    assert_eq!(totals[&OrderedFloat(8.0)].over.push, N);
    assert_eq!(totals[&OrderedFloat(8.5)].over.failure, N);

    // Through five: away 3, home 0
    let first_five = &results.totals.combined[&PeriodDescriptor::first_five()];
    assert_eq!(first_five[&OrderedFloat(4.5)].under.success, N);

    assert_eq!(results.totals.home[&full][&OrderedFloat(4.5)].over.success, N);
    assert_eq!(results.totals.away[&full][&OrderedFloat(4.5)].under.success, N);

    for lines in results.totals.combined.values() {
        for counts in lines.values() {
            assert!(counts.over.is_consistent());
            assert_eq!(counts.over.total, N);
        }
    }
}

#[test]
fn test_props_from_saved_configuration() {
    let config = StatCaptureConfig::from_json(SAVED_CONFIG).unwrap();
    let results = calculate_sim_counts(&batch(), &lineups(), &config).unwrap();

    let leadoff = &results.props.player[&AWAY_LEADOFF];
    assert_eq!(leadoff.team_name, "Yankees");
    assert_eq!(leadoff.stats[&PlayerStat::Hits][&OrderedFloat(0.5)].success, N);

    let starter = &results.props.player[&HOME_STARTER];
    assert_eq!(starter.stats[&PlayerStat::Strikeouts][&OrderedFloat(2.5)].success, N);

    // Never used in any game
    assert!(!results.props.player.contains_key(&2));

    let scoring = results.props.scoring_order.unwrap();
    assert_eq!(scoring.side(TeamSide::Away).first.unwrap().success, N);
    assert_eq!(scoring.side(TeamSide::Home).last.unwrap().success, N);

    assert_eq!(results.props.first_inning.overall.failure, N);
}

#[test]
fn test_report_rows_serialize() {
    let config = StatCaptureConfig::from_json(SAVED_CONFIG).unwrap();
    let results = calculate_sim_counts(&batch(), &lineups(), &config).unwrap();
    let report = build_report(&results);

    let json = serde_json::to_value(&report).unwrap();
    let sides = json["sides"].as_array().unwrap();
    // Moneyline plus +/-1.5 for each side
    assert_eq!(sides.len(), 6);
    assert!(sides.iter().all(|row| row.get("probability").is_some()));
    assert_eq!(json["scoringOrder"].as_array().unwrap().len(), 4);
}

#[test]
fn test_invalid_period_is_an_error() {
    let bad = PeriodDescriptor {
        code: simdash_rust_core::period::PeriodTypeCode::H,
        number: 2,
    };
    assert!(matches!(
        score_at_period(&five_three_game(), &bad),
        Err(SimCoreError::InvalidPeriod { .. })
    ));
}

#[test]
fn test_empty_game_is_malformed() {
    let batch: SimulationBatch = vec![five_three_game(), SimulatedGame::default()]
        .into_iter()
        .collect();
    let err = calculate_sim_counts(&batch, &lineups(), &StatCaptureConfig::default()).unwrap_err();
    assert!(matches!(err, SimCoreError::MalformedBatch(_)));
}
