//! Outcome counting shared by every market aggregator.
//!
//! Each game contributes one value; the value is classified against a line
//! with strict `<` / `>` / `==` comparisons. Counting is sharded across the
//! rayon pool and reduced by summing partial counts.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Success/failure/push tally for one line.
///
/// `success + failure + push == total` for every tally produced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub success: u32,
    pub failure: u32,
    pub push: u32,
    pub total: u32,
}

impl OutcomeCounts {
    #[inline]
    pub const fn zero() -> Self {
        Self {
            success: 0,
            failure: 0,
            push: 0,
            total: 0,
        }
    }

    /// Counts for a yes/no market with no push branch
    pub fn from_successes(success: u32, total: u32) -> Self {
        Self {
            success,
            failure: total.saturating_sub(success),
            push: 0,
            total,
        }
    }

    #[inline]
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.success += 1,
            Outcome::Failure => self.failure += 1,
            Outcome::Push => self.push += 1,
        }
        self.total += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.success + self.failure + self.push == self.total
    }
}

impl Add for OutcomeCounts {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            success: self.success + other.success,
            failure: self.failure + other.failure,
            push: self.push + other.push,
            total: self.total + other.total,
        }
    }
}

impl AddAssign for OutcomeCounts {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for OutcomeCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Push,
}

/// Which side of the line counts as a success
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Success when value > line
    Over,
    /// Success when value < line
    Under,
}

/// Classify a single value against a line
#[inline]
pub fn classify(value: f64, line: f64, direction: Direction) -> Outcome {
    if value == line {
        return Outcome::Push;
    }
    let above = value > line;
    match (direction, above) {
        (Direction::Over, true) | (Direction::Under, false) => Outcome::Success,
        _ => Outcome::Failure,
    }
}

/// Tally a per-game series against one line.
pub fn count_outcomes(values: &[f64], line: f64, direction: Direction) -> OutcomeCounts {
    values
        .par_iter()
        .fold(OutcomeCounts::zero, |mut counts, &value| {
            counts.record(classify(value, line, direction));
            counts
        })
        .reduce(OutcomeCounts::zero, Add::add)
}
