//! American odds and probability conversion.
//!
//! American prices live in two ranges: `>= +100` (underdog) and `<= -100`
//! (favourite). Anything strictly between is not a price and is rejected.

use crate::error::{Result, SimCoreError};
use crate::outcome::OutcomeCounts;

/// Price quoted as "even" / "EV"
pub const EVEN_ODDS: f64 = 100.0;

/// z-score for a 95% confidence interval
const Z_95: f64 = 1.96;

/// How pushes are treated when turning counts into a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushPolicy {
    /// Stake returned: pushes are excluded from the denominator
    #[default]
    Refund,
    /// Pushes count as losses
    Lose,
}

fn validate_odds(odds: f64) -> Result<f64> {
    if odds.is_finite() && (odds >= 100.0 || odds <= -100.0) {
        Ok(odds)
    } else {
        Err(SimCoreError::InvalidOdds(odds.to_string()))
    }
}

/// Parse a textual American price ("+150", "-110", "even", "EV").
pub fn parse_american_odds(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("even") || trimmed.eq_ignore_ascii_case("ev") {
        return Ok(EVEN_ODDS);
    }
    let odds = trimmed
        .trim_start_matches('+')
        .parse::<f64>()
        .map_err(|_| SimCoreError::InvalidOdds(trimmed.to_string()))?;
    validate_odds(odds)
}

/// Implied probability of an American price.
#[inline]
pub fn american_odds_to_probability(odds: f64) -> Result<f64> {
    let odds = validate_odds(odds)?;
    if odds > 0.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(odds / (odds - 100.0))
    }
}

/// Breakeven American price for a probability.
///
/// `p >= 0.5` maps to a negative price, anything below to a positive one.
#[inline]
pub fn probability_to_american_odds(probability: f64) -> Result<f64> {
    if !(probability > 0.0 && probability < 1.0) {
        return Err(SimCoreError::InvalidProbability(probability));
    }
    if probability >= 0.5 {
        Ok(-100.0 * probability / (1.0 - probability))
    } else {
        Ok(100.0 * (1.0 - probability) / probability)
    }
}

/// Success probability from outcome counts.
///
/// Returns 0.0 when the denominator is empty.
pub fn counts_to_probability(counts: &OutcomeCounts, policy: PushPolicy) -> f64 {
    let denominator = match policy {
        PushPolicy::Refund => counts.success + counts.failure,
        PushPolicy::Lose => counts.success + counts.failure + counts.push,
    };
    if denominator == 0 {
        return 0.0;
    }
    counts.success as f64 / denominator as f64
}

/// Fair (breakeven) American price from outcome counts
pub fn counts_to_american_odds(counts: &OutcomeCounts, policy: PushPolicy) -> Result<f64> {
    probability_to_american_odds(counts_to_probability(counts, policy))
}

/// Remove the vig from a two-way market, returning the first side's share
pub fn devig_probabilities(probability_a: f64, probability_b: f64) -> f64 {
    probability_a / (probability_a + probability_b)
}

/// No-vig American price for the first side of a two-way quote
pub fn devig_american_odds(odds_a: f64, odds_b: f64) -> Result<f64> {
    let probability_a = american_odds_to_probability(odds_a)?;
    let probability_b = american_odds_to_probability(odds_b)?;
    probability_to_american_odds(devig_probabilities(probability_a, probability_b))
}

/// 95% margin of error for a proportion observed over `total` trials
pub fn margin_of_error(total: u32, proportion: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    Z_95 * ((proportion * (1.0 - proportion)) / total as f64).sqrt()
}

/// Distance from price `a` to price `b`, skipping the dead zone between
/// -100 and +100 (so -105 to +105 is 10 cents, not 210).
pub fn american_odds_difference(a: f64, b: f64) -> f64 {
    let a_positive = a > 0.0;
    let b_positive = b > 0.0;

    if a_positive == b_positive {
        b - a
    } else if a_positive {
        (b + 100.0) - (a - 100.0)
    } else {
        (b - 100.0) - (a + 100.0)
    }
}
