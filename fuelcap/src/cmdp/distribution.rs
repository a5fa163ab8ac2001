// Fuelcap: Synthesizing Resource-Aware Controllers for Consumption MDPs
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Probability distributions over states
//!
//! Probabilities are exact rationals and must sum up to exactly 1. Floating
//! point numbers are banned from the entire crate: with floats, checks like
//! `0.06 + 0.82 + 0.12 == 1` fail and poison every fixpoint downstream.

use super::types::{CmdpError, StateId};
use itertools::Itertools;
use num_rational::Rational64;
use num_traits::{One, Zero};
use std::collections::BTreeMap;
use std::fmt;

/// A probability distribution over successor states.
///
/// The probabilities are exact rationals, strictly positive, and sum up to
/// exactly 1. Successors are iterated in ascending state order, which makes
/// every computation on top of a distribution deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    probs: BTreeMap<StateId, Rational64>,
}

impl Distribution {
    /// Create a distribution from (successor, probability) pairs.
    ///
    /// Fails with [`CmdpError::InvalidDistribution`] if any probability is
    /// not strictly positive, if a successor appears twice, or if the sum is
    /// not exactly 1.
    pub fn new(pairs: impl IntoIterator<Item = (StateId, Rational64)>) -> Result<Self, CmdpError> {
        let mut probs: BTreeMap<StateId, Rational64> = BTreeMap::new();
        for (state, p) in pairs {
            if p <= Rational64::zero() {
                return Err(CmdpError::InvalidDistribution(format!(
                    "probability {} of state {} is not positive",
                    p, state
                )));
            }
            if probs.insert(state, p).is_some() {
                return Err(CmdpError::InvalidDistribution(format!(
                    "state {} appears more than once",
                    state
                )));
            }
        }
        let sum: Rational64 = probs.values().sum();
        if !sum.is_one() {
            return Err(CmdpError::InvalidDistribution(format!(
                "probabilities sum up to {}, not 1",
                sum
            )));
        }
        Ok(Self { probs })
    }

    /// The distribution that reaches `state` with probability 1.
    pub fn dirac(state: StateId) -> Self {
        let mut probs = BTreeMap::new();
        probs.insert(state, Rational64::one());
        Self { probs }
    }

    /// The uniform distribution over the given destinations.
    ///
    /// Each destination gets probability `1/n` exactly; duplicates are
    /// collapsed. Fails if `destinations` is empty.
    pub fn uniform(destinations: &[StateId]) -> Result<Self, CmdpError> {
        let dests: Vec<StateId> = destinations.iter().copied().unique().collect();
        if dests.is_empty() {
            return Err(CmdpError::InvalidDistribution(
                "a uniform distribution needs at least one destination".to_string(),
            ));
        }
        let p = Rational64::new(1, dests.len() as i64);
        Self::new(dests.into_iter().map(|s| (s, p)))
    }

    /// Iterate over `(successor, probability)` pairs in ascending state order.
    pub fn pairs(&self) -> impl Iterator<Item = (StateId, Rational64)> + '_ {
        self.probs.iter().map(|(&s, &p)| (s, p))
    }

    /// Iterate over the successor states in ascending order.
    pub fn successors(&self) -> impl Iterator<Item = StateId> + '_ {
        self.probs.keys().copied()
    }

    /// The probability of reaching `state` (0 if it is not a successor).
    pub fn probability(&self, state: StateId) -> Rational64 {
        self.probs.get(&state).copied().unwrap_or_else(Rational64::zero)
    }

    /// Returns true if and only if `state` is a successor.
    pub fn contains(&self, state: StateId) -> bool {
        self.probs.contains_key(&state)
    }

    /// The number of successors.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Returns true if the distribution has no successors. Never holds for a
    /// distribution built through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.probs.iter().format_with(", ", |(s, p), fmt| fmt(&format_args!("{}: {}", s, p)))
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accepts_exact_sum() {
        let d = Distribution::new(vec![
            (0, Rational64::new(1, 2)),
            (1, Rational64::new(1, 4)),
            (2, Rational64::new(1, 4)),
        ])
        .unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.probability(1), Rational64::new(1, 4));
        assert_eq!(d.probability(7), Rational64::new(0, 1));
    }

    #[test]
    fn test_rejects_wrong_sum() {
        let result = Distribution::new(vec![
            (0, Rational64::new(1, 2)),
            (1, Rational64::new(1, 4)),
        ]);
        assert!(matches!(result, Err(CmdpError::InvalidDistribution(_))));
    }

    #[test]
    fn test_rejects_nonpositive() {
        let result = Distribution::new(vec![
            (0, Rational64::new(3, 2)),
            (1, Rational64::new(-1, 2)),
        ]);
        assert!(matches!(result, Err(CmdpError::InvalidDistribution(_))));
    }

    #[test]
    fn test_rejects_duplicate_successor() {
        let result = Distribution::new(vec![
            (0, Rational64::new(1, 2)),
            (0, Rational64::new(1, 2)),
        ]);
        assert!(matches!(result, Err(CmdpError::InvalidDistribution(_))));
    }

    #[test]
    fn test_uniform_is_exact() {
        // 1/3 + 1/3 + 1/3 is exactly 1 with rationals, no rounding residue
        let d = Distribution::uniform(&[4, 2, 9]).unwrap();
        assert_eq!(d.probability(2), Rational64::new(1, 3));
        assert_eq!(d.successors().collect::<Vec<_>>(), vec![2, 4, 9]);
        assert!(Distribution::uniform(&[]).is_err());
    }

    #[test]
    fn test_dirac() {
        let d = Distribution::dirac(3);
        assert_eq!(d.probability(3), Rational64::new(1, 1));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_display() {
        let d = Distribution::new(vec![
            (1, Rational64::new(1, 2)),
            (0, Rational64::new(1, 2)),
        ])
        .unwrap();
        assert_eq!(d.to_string(), "{0: 1/2, 1: 1/2}");
    }
}
