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

//! # Consumption Markov Decision Processes
//!
//! This module holds the model every other part of the crate works on: a
//! finite-state MDP whose actions consume a non-negative integer amount of
//! energy, and whose designated *reload* states refill the energy to the
//! capacity of the running controller.
//!
//! The model is deliberately exact: probabilities are rationals
//! ([`Distribution`]), energy amounts are integers extended with `∞`
//! ([`Energy`]). See [`ConsMdp`] for the construction interface.

mod distribution;
mod mdp;
mod types;

pub use distribution::Distribution;
pub use mdp::{ActionData, ActionsFor, ConsMdp};
pub use types::{ActionId, CmdpError, Energy, ParseEnergyError, StateId};

pub use num_rational::Rational64;
