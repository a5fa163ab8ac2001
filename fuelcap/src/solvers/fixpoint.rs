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

//! # Fixpoint drivers
//!
//! Almost every energy computation in this crate ends up in
//! [`largest_fixpoint`] one way or another: a sweep over the states that
//! replaces each state value by the best action value until nothing changes.
//! The drivers are generic over an [`ActionValuation`], so the same loop
//! serves survival (worst-case successor), reachability (directed value with
//! a preferred successor), and the goal-leaning refinement (directed value
//! with probability tie-break).
//!
//! Both drivers are deterministic: states are visited in ascending id order,
//! actions in insertion order, and an incumbent action is only replaced by a
//! strictly better one. Which action wins a tie is therefore part of the
//! observable behavior, and the counter selectors built from the sweeps are
//! reproducible.

use crate::cmdp::{ActionData, ActionId, ConsMdp, Energy, Rational64, StateId};
use itertools::Itertools;
use log::*;

/// How a fixpoint sweep values the actions of one state and compares them.
///
/// `Key` is whatever the valuation needs to rank actions; the driver only
/// extracts the energy component and asks which of two keys is strictly
/// better.
pub(crate) trait ActionValuation {
    /// Comparison key produced for one action.
    type Key: Copy;

    /// Value an action under the current state values.
    fn evaluate(&self, action: &ActionData, values: &[Energy]) -> Self::Key;

    /// The energy component of a key.
    fn energy(key: Self::Key) -> Energy;

    /// Returns true if and only if `candidate` strictly beats `incumbent`.
    fn beats(candidate: Self::Key, incumbent: Self::Key) -> bool;
}

/// Worst-case action value: the highest value among the successors, plus the
/// consumption of the action. Successors satisfying `zero_cond` count as 0;
/// if all of them do, the maximum is 0.
///
/// The zero condition sees the current values, which lets the caller treat
/// "reload that is still usable" dynamically.
pub(crate) struct WorstCase<F>
where
    F: Fn(StateId, &[Energy]) -> bool,
{
    pub zero_cond: F,
}

impl<F> ActionValuation for WorstCase<F>
where
    F: Fn(StateId, &[Energy]) -> bool,
{
    type Key = Energy;

    fn evaluate(&self, action: &ActionData, values: &[Energy]) -> Energy {
        let mut worst = Energy::ZERO;
        for succ in action.distr.successors() {
            if (self.zero_cond)(succ, values) {
                continue;
            }
            worst = worst.max(values[succ]);
        }
        worst + action.cons
    }

    fn energy(key: Energy) -> Energy {
        key
    }

    fn beats(candidate: Energy, incumbent: Energy) -> bool {
        candidate < incumbent
    }
}

/// Directed action value: pick one successor to aim for, require survival in
/// all the others.
///
/// For every candidate successor `t`, the value of aiming at `t` is the
/// maximum of `values[t]` and `survival[s]` over the remaining successors
/// `s ≠ t`. The action value is the minimum over all candidates, plus the
/// consumption.
pub(crate) struct Directed<'a> {
    pub survival: &'a [Energy],
}

impl<'a> ActionValuation for Directed<'a> {
    type Key = Energy;

    fn evaluate(&self, action: &ActionData, values: &[Energy]) -> Energy {
        let mut best = Energy::INF;
        for aim in action.distr.successors() {
            let mut v = values[aim];
            for succ in action.distr.successors() {
                if succ != aim {
                    v = v.max(self.survival[succ]);
                }
            }
            if v < best {
                best = v;
            }
        }
        best + action.cons
    }

    fn energy(key: Energy) -> Energy {
        key
    }

    fn beats(candidate: Energy, incumbent: Energy) -> bool {
        candidate < incumbent
    }
}

/// Directed action value with a probability tie-break.
///
/// Works like [`Directed`], but the key carries the probability of actually
/// reaching the aimed-for successor, and keys are compared lexicographically:
/// lower energy first, higher probability second. Successors whose
/// probability is below `threshold` are not considered as aims (set the
/// threshold to 0 to consider all of them).
pub(crate) struct GoalLeaning<'a> {
    pub survival: &'a [Energy],
    pub threshold: Rational64,
}

impl<'a> ActionValuation for GoalLeaning<'a> {
    type Key = (Energy, Rational64);

    fn evaluate(&self, action: &ActionData, values: &[Energy]) -> Self::Key {
        let mut best = Energy::INF;
        let mut prob = Rational64::new(0, 1);
        for (aim, p) in action.distr.pairs() {
            if p < self.threshold {
                continue;
            }
            let mut v = values[aim];
            for succ in action.distr.successors() {
                if succ != aim {
                    v = v.max(self.survival[succ]);
                }
            }
            if v < best || (v == best && p > prob) {
                best = v;
                prob = p;
            }
        }
        (best + action.cons, prob)
    }

    fn energy(key: Self::Key) -> Energy {
        key.0
    }

    fn beats(candidate: Self::Key, incumbent: Self::Key) -> bool {
        candidate.0 < incumbent.0 || (candidate.0 == incumbent.0 && candidate.1 > incumbent.1)
    }
}

/// Largest fixpoint over a vector of state values.
///
/// The value of a state is the minimum over its action values; values only
/// ever decrease. The caller initializes `values` (usually to `∞`),
/// `value_adj` post-processes each candidate (capacity cap, reload
/// treatment), `skip_state` exempts pinned states, and `on_update` is called
/// for every strict decrease with the new (finite) value and the winning
/// action. Values are integers bounded from below, so the loop terminates.
pub(crate) fn largest_fixpoint<V, Adj, Skip, Upd>(
    mdp: &ConsMdp,
    values: &mut [Energy],
    valuation: &V,
    mut value_adj: Adj,
    mut skip_state: Skip,
    mut on_update: Upd,
) where
    V: ActionValuation,
    Adj: FnMut(StateId, Energy) -> Energy,
    Skip: FnMut(StateId) -> bool,
    Upd: FnMut(StateId, u32, ActionId),
{
    let num_states = values.len();
    let mut sweep = 0usize;
    let mut iterate = true;
    while iterate {
        trace!("sweep {}: [{}]", sweep, values.iter().format(", "));
        sweep += 1;
        iterate = false;

        for s in 0..num_states {
            if skip_state(s) {
                continue;
            }

            // minimum over the action values; ties keep the earlier action
            let mut best: Option<(ActionId, V::Key)> = None;
            for (aid, action) in mdp.actions_for(s) {
                let key = valuation.evaluate(action, values);
                match best {
                    Some((_, incumbent)) if !V::beats(key, incumbent) => {}
                    _ => best = Some((aid, key)),
                }
            }
            let (aid, key) = match best {
                Some(found) => found,
                None => continue,
            };

            let candidate = value_adj(s, V::energy(key));
            if candidate < values[s] {
                values[s] = candidate;
                if let Energy::Finite(new_value) = candidate {
                    on_update(s, new_value, aid);
                }
                iterate = true;
            }
        }
    }
    trace!("converged after {} sweeps", sweep);
}

/// Least fixpoint over a vector of state values.
///
/// Same sweep as [`largest_fixpoint`], but values only ever increase and
/// states whose value is already `∞` are skipped. The caller initializes
/// `values` to a lower bound of the fixpoint (for survival: the minimal
/// initial consumption).
pub(crate) fn least_fixpoint<V, Adj>(
    mdp: &ConsMdp,
    values: &mut [Energy],
    valuation: &V,
    mut value_adj: Adj,
) where
    V: ActionValuation,
    Adj: FnMut(StateId, Energy) -> Energy,
{
    let num_states = values.len();
    let mut sweep = 0usize;
    let mut iterate = true;
    while iterate {
        trace!("sweep {}: [{}]", sweep, values.iter().format(", "));
        sweep += 1;
        iterate = false;

        for s in 0..num_states {
            if values[s].is_infinite() {
                continue;
            }

            let mut best: Option<V::Key> = None;
            for (_, action) in mdp.actions_for(s) {
                let key = valuation.evaluate(action, values);
                match best {
                    Some(incumbent) if !V::beats(key, incumbent) => {}
                    _ => best = Some(key),
                }
            }
            let key = match best {
                Some(found) => found,
                None => continue,
            };

            let candidate = value_adj(s, V::energy(key));
            if candidate > values[s] {
                values[s] = candidate;
                iterate = true;
            }
        }
    }
    trace!("converged after {} sweeps", sweep);
}
