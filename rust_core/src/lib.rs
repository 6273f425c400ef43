//! SimDash Core - Simulation outcome aggregation and market calibration.
//!
//! This module provides:
//! - Period-scoped score extraction over simulated play sequences
//! - Success/failure/push counting shared by every market
//! - Sides, totals, team prop and player prop aggregation over a batch
//! - American odds conversion and fair pricing
//! - Flat report rows, results summary and series probabilities
//! - Optimal leans search against quoted moneyline and total prices
//!
//! Per-game work is parallelised with rayon; the only asynchronous
//! boundary is the external game simulator used by calibration.

pub mod aggregation;
pub mod calibration;
pub mod error;
pub mod logging;
pub mod models;
pub mod odds;
pub mod outcome;
pub mod period;
pub mod report;

pub use aggregation::{calculate_sim_counts, LineKey, SimResults};
pub use calibration::{
    CalibrationPolicy, GameSimulator, LeanParameters, LeansFinder, MarketLines, OptimalLeans,
};
pub use error::{Result, SimCoreError};
pub use models::{MatchupLineups, SimulatedGame, SimulationBatch, StatCaptureConfig};
pub use outcome::OutcomeCounts;
pub use period::PeriodDescriptor;
