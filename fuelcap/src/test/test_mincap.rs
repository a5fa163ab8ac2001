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

//! The minimal-capacity search.

use crate::cmdp::Energy;
use crate::mincap::{min_capacity, DEFAULT_STARTING_CAPACITY};
use crate::models;
use crate::solvers::{EnergySolver, Objective};
use crate::Error;

#[test]
fn test_min_capacity_buchi() {
    let (mdp, targets) = models::double_flower();
    let cap = min_capacity(
        &mdp,
        0,
        targets.iter().copied(),
        Objective::Buchi,
        DEFAULT_STARTING_CAPACITY,
        None,
    )
    .unwrap();
    assert_eq!(cap, 15);
}

#[test]
fn test_min_capacity_out_of_range() {
    let (mdp, targets) = models::double_flower();
    let result =
        min_capacity(&mdp, 0, targets.iter().copied(), Objective::Buchi, 14, None);
    assert!(matches!(result, Err(Error::CapacityTooSmall(14))));
}

#[test]
fn test_min_capacity_almost_sure() {
    let (mdp, targets) = models::double_flower();
    let cap = min_capacity(
        &mdp,
        3,
        targets.iter().copied(),
        Objective::AsReach,
        DEFAULT_STARTING_CAPACITY,
        None,
    )
    .unwrap();
    assert_eq!(cap, 7);
}

/// The returned capacity is minimal: it works, its predecessor does not.
#[test]
fn test_min_capacity_is_tight() {
    let (mdp, targets) = models::double_flower();
    for (init, objective, cap) in vec![(0, Objective::Buchi, 15), (3, Objective::AsReach, 7)] {
        let mut works =
            EnergySolver::with_targets(&mdp, Energy::Finite(cap), targets.iter().copied())
                .unwrap();
        assert!(works.min_levels(objective)[init].within(Energy::Finite(cap)));
        let mut fails =
            EnergySolver::with_targets(&mdp, Energy::Finite(cap - 1), targets.iter().copied())
                .unwrap();
        assert!(!fails.min_levels(objective)[init].within(Energy::Finite(cap - 1)));
    }
}

/// The search works when the answer is exactly the upper end of the range.
#[test]
fn test_min_capacity_at_range_end() {
    let (mdp, targets) = models::double_flower();
    let cap =
        min_capacity(&mdp, 0, targets.iter().copied(), Objective::Buchi, 15, None).unwrap();
    assert_eq!(cap, 15);
}

#[test]
fn test_min_capacity_respects_max_starting_load() {
    let (mdp, targets) = models::double_flower();
    // with capacity 15 state 0 needs 6; demanding a start below that must
    // push the capacity up or fail
    let result = min_capacity(
        &mdp,
        0,
        targets.iter().copied(),
        Objective::Buchi,
        DEFAULT_STARTING_CAPACITY,
        Some(5),
    );
    match result {
        Ok(cap) => {
            let mut solver =
                EnergySolver::with_targets(&mdp, Energy::Finite(cap), targets.iter().copied())
                    .unwrap();
            assert!(solver.min_levels(Objective::Buchi)[0].within(Energy::Finite(5)));
        }
        Err(Error::CapacityTooSmall(_)) => {}
        Err(e) => panic!("unexpected error: {}", e),
    }
}

#[test]
fn test_min_capacity_rejects_other_objectives() {
    let (mdp, targets) = models::double_flower();
    let result = min_capacity(
        &mdp,
        0,
        targets.iter().copied(),
        Objective::Safe,
        DEFAULT_STARTING_CAPACITY,
        None,
    );
    assert!(matches!(result, Err(Error::UnsupportedObjective(Objective::Safe))));
}
