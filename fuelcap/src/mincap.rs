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

//! # Minimal sufficient capacity
//!
//! Binary search for the smallest capacity under which an objective can be
//! satisfied from a given starting state. The solver is used as an oracle:
//! every probe builds a fresh [`EnergySolver`] with the candidate capacity
//! and checks the min-level of the starting state.

use crate::cmdp::{ConsMdp, Energy, StateId};
use crate::solvers::{EnergySolver, Objective};
use crate::Error;
use log::*;

/// The default upper end of the searched capacity range.
pub const DEFAULT_STARTING_CAPACITY: u32 = 100;

/// Find the minimal capacity for which `objective` can be satisfied from
/// `init_state`, searching the range `[1, starting_capacity]`.
///
/// If `max_starting_load` is given, a capacity only counts as sufficient if
/// the required initial load in `init_state` does not exceed it; otherwise
/// any load within the capacity is acceptable.
///
/// Only [`Objective::AsReach`] and [`Objective::Buchi`] are supported; other
/// objectives fail with [`Error::UnsupportedObjective`]. Fails with
/// [`Error::CapacityTooSmall`] when no capacity in the range is sufficient.
pub fn min_capacity(
    mdp: &ConsMdp,
    init_state: StateId,
    targets: impl IntoIterator<Item = StateId>,
    objective: Objective,
    starting_capacity: u32,
    max_starting_load: Option<u32>,
) -> Result<u32, Error> {
    match objective {
        Objective::AsReach | Objective::Buchi => {}
        _ => return Err(Error::UnsupportedObjective(objective)),
    }
    if init_state >= mdp.num_states() {
        return Err(crate::cmdp::CmdpError::UnknownState(init_state).into());
    }
    let targets: Vec<StateId> = targets.into_iter().collect();

    let probe = |capacity: u32| -> Result<bool, Error> {
        let mut solver =
            EnergySolver::with_targets(mdp, Energy::Finite(capacity), targets.iter().copied())?;
        let level = solver.min_levels(objective)[init_state];
        let max_load = max_starting_load.unwrap_or(capacity);
        let enough = level.within(Energy::Finite(max_load));
        debug!(
            "capacity {}: needs {} in state {} ({})",
            capacity,
            level,
            init_state,
            if enough { "enough" } else { "not enough" }
        );
        Ok(enough)
    };

    let mut low = 1u32;
    let mut high = starting_capacity.max(1);
    while low < high {
        let mid = (low + high) / 2;
        if probe(mid)? {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    // `low` itself has not necessarily been probed yet
    if probe(low)? {
        info!("minimal sufficient capacity is {}", low);
        Ok(low)
    } else {
        Err(Error::CapacityTooSmall(starting_capacity))
    }
}
