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

//! # Prepared models
//!
//! Small consumption MDPs with well-understood solutions, used throughout
//! the test suite and handy for experimenting with the solvers.

use crate::cmdp::{ConsMdp, Distribution, Rational64, StateId};

fn half() -> Rational64 {
    Rational64::new(1, 2)
}

fn two_way(a: StateId, b: StateId) -> Distribution {
    Distribution::new(vec![(a, half()), (b, half())]).unwrap()
}

/// Two "flowers" of reload cycles joined by a stem, with the targets spread
/// over one of them.
///
/// 11 states; reloads `{2, 4, 9}`; targets `{7, 8, 10}`. The smallest
/// capacity for which the Büchi objective is satisfiable from state 0
/// is 15, and at capacity 15 the Büchi levels are
/// `[6, ∞, ∞, 3, 0, 1, 10, ∞, 4, ∞, ∞]`.
pub fn double_flower() -> (ConsMdp, Vec<StateId>) {
    let mut m = ConsMdp::new();
    m.new_states(11);
    for r in vec![2, 4, 9] {
        m.set_reload(r, true).unwrap();
    }
    let targets = vec![7, 8, 10];

    m.add_action(0, two_way(1, 2), "a", 1).unwrap();
    m.add_action(0, two_way(3, 4), "t", 3).unwrap();
    m.add_action(1, Distribution::dirac(2), "", 1).unwrap();
    m.add_action(2, Distribution::dirac(1), "", 1).unwrap();

    m.add_action(3, two_way(2, 7), "p", 1).unwrap();
    m.add_action(3, Distribution::dirac(5), "r", 2).unwrap();
    m.add_action(3, Distribution::dirac(6), "a", 3).unwrap();

    m.add_action(4, Distribution::dirac(5), "", 1).unwrap();
    m.add_action(5, Distribution::dirac(4), "r", 1).unwrap();
    m.add_action(5, Distribution::dirac(3), "t", 1).unwrap();

    m.add_action(6, two_way(7, 10), "a", 3).unwrap();
    m.add_action(6, two_way(3, 8), "B", 6).unwrap();

    m.add_action(7, Distribution::dirac(9), "", 1).unwrap();
    m.add_action(9, Distribution::dirac(9), "", 1).unwrap();
    m.add_action(10, Distribution::dirac(9), "", 1).unwrap();

    m.add_action(8, Distribution::dirac(5), "r", 3).unwrap();

    (m, targets)
}

/// A reload hub with a detour whose cost dwarfs the rest of the model.
///
/// 3 states; reload `{0}`. Surviving from state 1 requires paying the
/// expensive way home (1000 units), from state 2 one unit more. Useful for
/// exercising capacities around the 1000 mark.
pub fn expensive_loop() -> ConsMdp {
    let mut m = ConsMdp::new();
    m.new_states(3);
    m.set_reload(0, true).unwrap();

    m.add_action(0, Distribution::dirac(0), "", 1).unwrap();
    m.add_action(1, Distribution::dirac(0), "a", 1000).unwrap();
    m.add_action(1, Distribution::dirac(2), "b", 1).unwrap();
    m.add_action(2, Distribution::dirac(1), "b", 1).unwrap();
    m
}

/// The smallest model separating positive from almost-sure reachability.
///
/// 4 states; reload `{3}`; targets `{1, 2}`. The action `pos` of state 0
/// reaches a target with probability 1/2 only; the action `t` reaches one
/// for sure but costs more. With capacity 10 the positive-reachability
/// levels are `[2, 1, 2, ∞]`, the almost-sure levels `[4, 1, 2, ∞]`.
pub fn little_alsure() -> (ConsMdp, Vec<StateId>) {
    let mut m = ConsMdp::new();
    m.new_states(4);
    m.set_reload(3, true).unwrap();
    let targets = vec![1, 2];

    m.add_action(0, two_way(1, 2), "t", 2).unwrap();
    m.add_action(1, Distribution::dirac(3), "r", 1).unwrap();
    m.add_action(2, Distribution::dirac(3), "r", 2).unwrap();
    m.add_action(3, Distribution::dirac(3), "r", 3).unwrap();
    m.add_action(0, two_way(1, 3), "pos", 1).unwrap();

    (m, targets)
}

/// Two actions with the same energy value but different odds of progress.
///
/// 3 states; reloads `{0, 2}`; target `{2}`. Both actions of state 0 cost
/// the same and have the same directed value, but `bottom` moves on with
/// probability 7/10 instead of 1/2. A goal-leaning solver must prefer it;
/// the basic solver sticks with the first action inserted.
pub fn tie_break() -> (ConsMdp, Vec<StateId>) {
    let mut m = ConsMdp::new();
    m.new_states(3);
    m.set_reload(0, true).unwrap();
    m.set_reload(2, true).unwrap();
    let targets = vec![2];

    m.add_action(0, two_way(0, 1), "top", 1).unwrap();
    m.add_action(
        0,
        Distribution::new(vec![(0, Rational64::new(3, 10)), (1, Rational64::new(7, 10))]).unwrap(),
        "bottom",
        1,
    )
    .unwrap();
    m.add_action(1, Distribution::dirac(2), "r", 1).unwrap();
    m.add_action(2, Distribution::dirac(2), "r", 2).unwrap();

    (m, targets)
}
