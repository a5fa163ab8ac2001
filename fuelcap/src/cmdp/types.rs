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

//! Module containing all type definitions for consumption MDPs

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// State identification (zero-based index, stable for the lifetime of a CMDP)
pub type StateId = usize;
/// Action identification (index into the action arena, stable across removals)
pub type ActionId = usize;

/// An amount of energy: a finite number of units, or infinity.
///
/// Infinity plays two roles. As a capacity it means "unbounded storage", and
/// in a min-level vector it means "no finite amount of energy suffices from
/// this state". Addition saturates (`∞ + x = ∞`, and a finite overflow turns
/// into `∞`), and the derived order places every finite value below `∞`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Energy {
    /// A finite number of energy units.
    Finite(u32),
    /// More energy than any finite amount.
    Infinite,
}

impl Energy {
    /// No energy at all.
    pub const ZERO: Self = Energy::Finite(0);
    /// The infinite amount.
    pub const INF: Self = Energy::Infinite;

    /// Returns true if and only if the amount is finite.
    pub fn is_finite(self) -> bool {
        matches!(self, Energy::Finite(_))
    }

    /// Returns true if and only if the amount is infinite.
    pub fn is_infinite(self) -> bool {
        matches!(self, Energy::Infinite)
    }

    /// The finite amount, or `None` for `∞`.
    pub fn finite(self) -> Option<u32> {
        match self {
            Energy::Finite(v) => Some(v),
            Energy::Infinite => None,
        }
    }

    /// Returns true if the amount is finite and can be stored under the given
    /// capacity. `∞` fits no capacity, not even an unbounded one.
    pub fn within(self, capacity: Energy) -> bool {
        self.is_finite() && self <= capacity
    }

    /// Subtract `units`, keeping `∞` absorbing. Returns `None` if the
    /// subtraction would make a finite amount negative.
    pub fn checked_sub(self, units: u32) -> Option<Energy> {
        match self {
            Energy::Finite(v) => v.checked_sub(units).map(Energy::Finite),
            Energy::Infinite => Some(Energy::Infinite),
        }
    }
}

impl std::ops::Add<u32> for Energy {
    type Output = Energy;

    fn add(self, units: u32) -> Energy {
        match self {
            Energy::Finite(v) => v.checked_add(units).map_or(Energy::Infinite, Energy::Finite),
            Energy::Infinite => Energy::Infinite,
        }
    }
}

impl From<u32> for Energy {
    fn from(units: u32) -> Self {
        Energy::Finite(units)
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Energy::Finite(v) => write!(f, "{}", v),
            Energy::Infinite => write!(f, "∞"),
        }
    }
}

impl FromStr for Energy {
    type Err = ParseEnergyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inf" | "∞" => Ok(Energy::Infinite),
            _ => s.parse::<u32>().map(Energy::Finite).map_err(|_| ParseEnergyError(s.to_string())),
        }
    }
}

/// The string is neither a non-negative integer nor `inf`/`∞`.
#[derive(Error, Debug, PartialEq)]
#[error("{0:?} is not an energy amount (expected a non-negative integer, \"inf\" or \"∞\")")]
pub struct ParseEnergyError(pub String);

/// CMDP construction and lookup errors
#[derive(Error, Debug, PartialEq)]
pub enum CmdpError {
    /// Reference to a state that was never created
    #[error("State {0} does not exist")]
    UnknownState(StateId),
    /// A source state cannot have two actions with the same label
    #[error("State {0} already has an action labeled {1:?}")]
    DuplicateLabel(StateId, String),
    /// Two states cannot share a name
    #[error("A state named {0:?} already exists (id {1})")]
    DuplicateName(String, StateId),
    /// The supplied probabilities do not form a distribution
    #[error("Not a probability distribution: {0}")]
    InvalidDistribution(String),
    /// Reference to an action that does not exist (or was removed)
    #[error("{0} is not a valid action id")]
    InvalidActionId(ActionId),
}
