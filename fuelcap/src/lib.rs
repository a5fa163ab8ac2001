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

#![deny(missing_docs)]

//! # Fuelcap: Synthesizing Resource-Aware Controllers for Consumption MDPs
//!
//! This is a library for synthesizing controllers for agents with a limited
//! energy store. The model is a *consumption Markov decision process*
//! (CMDP): a finite probabilistic transition system in which every action
//! consumes a non-negative integer amount of energy, and designated *reload*
//! states refill the store to a fixed *capacity*.
//!
//! ## Problem Statement
//! Given
//! - a CMDP, a capacity $C$, and a target set $T$,
//! - a qualitative objective: survival, positive or almost-sure
//!   reachability of $T$, or Büchi (visit $T$ infinitely often),
//!
//! compute for every state the minimal initial energy from which a strategy
//! can satisfy the objective without the energy ever dropping below zero
//! between reloads, and produce one such strategy in a finite form.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`cmdp`](cmdp)**: The model. See the main structure
//!   [`ConsMdp`](cmdp::ConsMdp), the exact-rational
//!   [`Distribution`](cmdp::Distribution), and [`Energy`](cmdp::Energy),
//!   the integers extended with `∞`.
//!
//! - **[`solvers`](solvers)**: The [`EnergySolver`](solvers::EnergySolver)
//!   computing minimal energy levels and strategies for every
//!   [`Objective`](solvers::Objective). Construction variants tune how ties
//!   between equally good actions are broken (goal-leaning) and how the
//!   survival levels are computed (least fixpoint).
//!
//! - **[`strategy`](strategy)**: Strategies as
//!   [`CounterSelectors`](strategy::CounterSelector): per state a step
//!   function from energy levels to actions. A
//!   [`CounterStrategy`](strategy::CounterStrategy) plays a selector
//!   online, tracking only the current state and energy.
//!
//! - **[`mec`](mec)**: [Maximal end-component](mec::mec_decompose)
//!   decomposition of the underlying graph, a building block for analyses
//!   on top of the solvers.
//!
//! - **[`mincap`](mincap)**: [Binary search](min_capacity) for the smallest
//!   capacity under which an objective is satisfiable from a given state.
//!
//! - **[`io`](io)**: JSON import and export of models, with exact rational
//!   probabilities.
//!
//! ## Usage
//!
//! Build the CMDP, pick a capacity and the targets, and ask a solver:
//!
//! ```
//! use fuelcap::cmdp::{ConsMdp, Distribution, Energy};
//! use fuelcap::solvers::{EnergySolver, Objective};
//! use fuelcap::Error;
//!
//! fn main() -> Result<(), Error> {
//!     // a patrol that must keep visiting the corner of a corridor
//!     let mut mdp = ConsMdp::new();
//!     let depot = mdp.new_state(true);
//!     let corridor = mdp.new_state(false);
//!     let corner = mdp.new_state(false);
//!     mdp.add_action(depot, Distribution::dirac(corridor), "out", 1)?;
//!     mdp.add_action(corridor, Distribution::dirac(corner), "on", 1)?;
//!     mdp.add_action(corner, Distribution::dirac(depot), "home", 1)?;
//!
//!     let mut solver = EnergySolver::with_targets(&mdp, Energy::Finite(5), vec![corner])?;
//!     let levels = solver.min_levels(Objective::Buchi);
//!     assert_eq!(levels[depot], Energy::Finite(0));
//!     assert_eq!(levels[corridor], Energy::Finite(2));
//!
//!     // the matching strategy, as a (state, energy) -> action table
//!     let selector = solver.selector(Objective::Buchi);
//!     let action = selector.select_action(corridor, 2)?;
//!     assert_eq!(mdp.action(action).map(|a| a.label.as_str()), Some("on"));
//!
//!     Ok(())
//! }
//! ```
// test modules
mod test;

pub mod cmdp;
mod error;
pub mod io;
pub mod mec;
pub mod mincap;
pub mod models;
pub mod solvers;
pub mod strategy;

pub use error::Error;
pub use mincap::min_capacity;
