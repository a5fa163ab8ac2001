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

//! The Büchi objective: visiting the targets infinitely often.

use super::common::lv;
use crate::cmdp::{ConsMdp, Distribution, Energy, Rational64};
use crate::solvers::{EnergySolver, Objective};
use crate::models;

#[test]
fn test_buchi_double_flower() {
    let (mdp, targets) = models::double_flower();
    let mut solver =
        EnergySolver::with_targets(&mdp, Energy::Finite(15), targets).unwrap();
    assert_eq!(
        solver.min_levels(Objective::Buchi),
        lv(&[6, -1, -1, 3, 0, 1, 10, -1, 4, -1, -1]).as_slice(),
    );
}

/// One unit of capacity below the threshold, nothing works anymore.
#[test]
fn test_buchi_double_flower_capacity_14() {
    let (mdp, targets) = models::double_flower();
    let mut solver =
        EnergySolver::with_targets(&mdp, Energy::Finite(14), targets).unwrap();
    assert_eq!(solver.min_levels(Objective::Buchi), vec![Energy::INF; 11].as_slice());
}

/// The cycle through the reload costs exactly the capacity; the reload must
/// still end up with level 0.
#[test]
fn test_buchi_reload_at_capacity() {
    let mut m = ConsMdp::new();
    m.new_states(4);
    m.set_reload(3, true).unwrap();
    let half = Rational64::new(1, 2);
    m.add_action(0, Distribution::new(vec![(1, half), (2, half)]).unwrap(), "t", 2).unwrap();
    m.add_action(1, Distribution::dirac(3), "r", 1).unwrap();
    m.add_action(2, Distribution::dirac(3), "r", 2).unwrap();
    m.add_action(3, Distribution::dirac(0), "r", 3).unwrap();
    m.add_action(0, Distribution::new(vec![(1, half), (3, half)]).unwrap(), "pos", 1).unwrap();

    let mut solver = EnergySolver::with_targets(&m, Energy::Finite(5), vec![1]).unwrap();
    assert_eq!(solver.min_levels(Objective::Buchi), lv(&[2, 1, 2, 0]).as_slice());
}

/// Büchi targets are pinned to the survival levels of the pruned MDP, not
/// the full one: target 8 keeps a finite level, the targets that die with
/// the culled reload 9 do not.
#[test]
fn test_buchi_target_levels() {
    let (mdp, targets) = models::double_flower();
    let mut solver =
        EnergySolver::with_targets(&mdp, Energy::Finite(15), targets).unwrap();
    let levels = solver.min_levels(Objective::Buchi);
    assert_eq!(levels[8], Energy::Finite(4));
    assert_eq!(levels[7], Energy::INF);
    assert_eq!(levels[10], Energy::INF);
}
