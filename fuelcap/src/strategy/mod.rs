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

//! # Counter selectors and counter strategies
//!
//! A [`CounterSelector`] is the finite representation of a strategy produced
//! by the solvers: for every state a [`SelectionRule`], a step function from
//! energy levels to actions. A selection according to a rule picks the
//! action registered at the largest lower bound that is not above the
//! current energy.
//!
//! A [`CounterStrategy`] plays a selector online. It is the only memory a
//! controller needs: the current state and the current energy level. The
//! energy bookkeeping follows the CMDP semantics, i.e. entering a reload
//! state refills the tank to the capacity before the next consumption is
//! subtracted.
//!
//! Calls to [`CounterStrategy::next_action`] and
//! [`CounterStrategy::update_state`] must alternate: every picked action has
//! to be resolved to one of its successors before the next pick.

use crate::cmdp::{ActionId, ConsMdp, Energy, StateId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors of selectors and strategies
#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    /// The selection rule has no entry at or below the queried energy level.
    #[error("No action is feasible for energy level {0}")]
    NoFeasibleAction(u32),
    /// `next_action` and `update_state` must alternate.
    #[error("Wrong call order: {0}")]
    WrongCallOrder(&'static str),
    /// The reported outcome is not a successor of the last picked action.
    #[error("State {0} is not a possible outcome of the last action")]
    InvalidOutcome(StateId),
    /// The last action consumed more energy than the strategy had.
    #[error("Energy depleted when leaving state {0}")]
    OutOfEnergy(StateId),
}

/// A selection rule: a step function from energy levels to actions.
///
/// For lower bounds `n₁ < n₂ < … < n_k` and energy `e`, the rule selects the
/// action at `n_i` where `i` is the largest index with `n_i ≤ e`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRule {
    rules: BTreeMap<u32, ActionId>,
}

impl SelectionRule {
    /// Register `action` for all energy levels from `lower_bound` up to the
    /// next registered bound.
    pub fn insert(&mut self, lower_bound: u32, action: ActionId) {
        self.rules.insert(lower_bound, action);
    }

    /// Select the action for the given energy level.
    pub fn select(&self, energy: u32) -> Result<ActionId, StrategyError> {
        self.rules
            .range(..=energy)
            .next_back()
            .map(|(_, &action)| action)
            .ok_or(StrategyError::NoFeasibleAction(energy))
    }

    /// Iterate over the `(lower bound, action)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, ActionId)> + '_ {
        self.rules.iter().map(|(&lb, &a)| (lb, a))
    }

    /// Returns true if the rule has no entries.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for SelectionRule {
    /// Print each entry as an interval of energy levels, `5 — 7: 3` or `8+: 4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut records = Vec::new();
        let bounds: Vec<u32> = self.rules.keys().copied().collect();
        for (i, (lb, action)) in self.iter().enumerate() {
            match bounds.get(i + 1) {
                Some(next) => records.push(format!("{} — {}: {}", lb, next - 1, action)),
                None => records.push(format!("{}+: {}", lb, action)),
            }
        }
        write!(f, "{{{}}}", records.iter().format(", "))
    }
}

/// A strategy representation mapping every state to a [`SelectionRule`].
///
/// The solvers build selectors in lockstep with their fixpoints: whenever
/// the value of a state strictly decreases, the winning action is recorded
/// at the new value. Selectors clone deeply and serialize as the plain list
/// of rules.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterSelector {
    rules: Vec<SelectionRule>,
}

impl CounterSelector {
    /// Create an empty selector for `num_states` states.
    pub fn new(num_states: usize) -> Self {
        Self { rules: vec![SelectionRule::default(); num_states] }
    }

    /// Drop all rules and resize for `num_states` states.
    pub fn reset(&mut self, num_states: usize) {
        self.rules.clear();
        self.rules.resize_with(num_states, SelectionRule::default);
    }

    /// Register `action` for `state` at energy levels starting from
    /// `lower_bound`.
    ///
    /// The caller is responsible for only registering actions that belong to
    /// `state`; the solvers guarantee this by construction.
    pub fn update(&mut self, state: StateId, lower_bound: u32, action: ActionId) {
        self.rules[state].insert(lower_bound, action);
    }

    /// Select the action for `state` at the given energy level.
    ///
    /// **Panics** if `state` is out of range.
    pub fn select_action(&self, state: StateId, energy: u32) -> Result<ActionId, StrategyError> {
        self.rules[state].select(energy)
    }

    /// The selection rule of one state.
    ///
    /// **Panics** if `state` is out of range.
    pub fn rule(&self, state: StateId) -> &SelectionRule {
        &self.rules[state]
    }

    /// The number of states this selector covers.
    pub fn num_states(&self) -> usize {
        self.rules.len()
    }

    /// Replace the rules for the given states by clones of the rules in
    /// `source`.
    pub fn copy_values_from(
        &mut self,
        source: &CounterSelector,
        states: impl IntoIterator<Item = StateId>,
    ) {
        for s in states {
            self.rules[s] = source.rules[s].clone();
        }
    }
}

impl fmt::Display for CounterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (s, rule) in self.rules.iter().enumerate() {
            writeln!(f, "{}: {}", s, rule)?;
        }
        Ok(())
    }
}

/// An online controller playing a [`CounterSelector`].
///
/// The strategy tracks the current state and energy. [`Self::next_action`]
/// picks the action for the current configuration;
/// [`Self::update_state`] resolves the picked action to the observed
/// successor, subtracting the consumption. Entering a reload state (the
/// initial state included) refills the energy to the capacity.
pub struct CounterStrategy<'a> {
    mdp: &'a ConsMdp,
    selector: &'a CounterSelector,
    capacity: Energy,
    energy: Energy,
    state: StateId,
    pending: Option<ActionId>,
}

impl<'a> CounterStrategy<'a> {
    /// Start playing in `init_state` with `init_energy`. If the initial
    /// state is a reload, the energy starts at the capacity instead.
    pub fn new(
        mdp: &'a ConsMdp,
        selector: &'a CounterSelector,
        capacity: Energy,
        init_energy: Energy,
        init_state: StateId,
    ) -> Self {
        let energy = if mdp.is_reload(init_state) { capacity } else { init_energy };
        Self { mdp, selector, capacity, energy, state: init_state, pending: None }
    }

    /// The current state.
    pub fn current_state(&self) -> StateId {
        self.state
    }

    /// The current energy level.
    pub fn energy(&self) -> Energy {
        self.energy
    }

    /// Pick the action to play in the current configuration.
    ///
    /// Fails with [`StrategyError::WrongCallOrder`] if the previous action
    /// has not been resolved yet, and with
    /// [`StrategyError::NoFeasibleAction`] if the selector has no rule for
    /// the current energy.
    pub fn next_action(&mut self) -> Result<ActionId, StrategyError> {
        if self.pending.is_some() {
            return Err(StrategyError::WrongCallOrder(
                "the outcome of the last action is not known yet, call `update_state` first",
            ));
        }
        let energy = match self.energy {
            Energy::Finite(e) => e,
            // with unbounded capacity, query the largest representable level
            Energy::Infinite => u32::MAX,
        };
        let action = self.selector.select_action(self.state, energy)?;
        self.pending = Some(action);
        Ok(action)
    }

    /// Resolve the last picked action to the observed successor `outcome`.
    ///
    /// Subtracts the consumption of the action, and refills the energy to
    /// the capacity when `outcome` is a reload state.
    pub fn update_state(&mut self, outcome: StateId) -> Result<(), StrategyError> {
        let action_id = self.pending.ok_or(StrategyError::WrongCallOrder(
            "no action was picked yet, call `next_action` first",
        ))?;
        // live by construction: only `next_action` sets `pending`
        let action = match self.mdp.action(action_id) {
            Some(a) => a,
            None => return Err(StrategyError::InvalidOutcome(outcome)),
        };
        if !action.distr.contains(outcome) {
            return Err(StrategyError::InvalidOutcome(outcome));
        }
        self.pending = None;
        self.energy = self
            .energy
            .checked_sub(action.cons)
            .ok_or(StrategyError::OutOfEnergy(self.state))?;
        self.state = outcome;
        if self.mdp.is_reload(outcome) {
            self.energy = self.capacity;
        }
        Ok(())
    }

    /// Shorthand for [`Self::update_state`] followed by
    /// [`Self::next_action`].
    pub fn next_action_after(&mut self, outcome: StateId) -> Result<ActionId, StrategyError> {
        self.update_state(outcome)?;
        self.next_action()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmdp::Distribution;

    #[test]
    fn test_selection_rule_steps() {
        let mut rule = SelectionRule::default();
        rule.insert(2, 10);
        rule.insert(5, 11);
        assert_eq!(rule.select(1), Err(StrategyError::NoFeasibleAction(1)));
        assert_eq!(rule.select(2), Ok(10));
        assert_eq!(rule.select(4), Ok(10));
        assert_eq!(rule.select(5), Ok(11));
        assert_eq!(rule.select(100), Ok(11));
    }

    #[test]
    fn test_selection_rule_display() {
        let mut rule = SelectionRule::default();
        rule.insert(2, 10);
        rule.insert(5, 11);
        assert_eq!(rule.to_string(), "{2 — 4: 10, 5+: 11}");
    }

    #[test]
    fn test_selector_serializes_as_rules() {
        let mut selector = CounterSelector::new(2);
        selector.update(0, 3, 7);
        let json = serde_json::to_string(&selector).unwrap();
        let back: CounterSelector = serde_json::from_str(&json).unwrap();
        assert_eq!(selector, back);
        assert_eq!(back.select_action(0, 3), Ok(7));
    }

    #[test]
    fn test_strategy_call_order() {
        let mut mdp = ConsMdp::new();
        let r = mdp.new_state(true);
        mdp.add_action(r, Distribution::dirac(r), "loop", 1).unwrap();
        let mut selector = CounterSelector::new(1);
        selector.update(r, 0, 0);

        let mut strategy =
            CounterStrategy::new(&mdp, &selector, Energy::Finite(5), Energy::Finite(5), r);
        assert!(matches!(strategy.update_state(r), Err(StrategyError::WrongCallOrder(_))));
        let action = strategy.next_action().unwrap();
        assert_eq!(action, 0);
        assert!(matches!(strategy.next_action(), Err(StrategyError::WrongCallOrder(_))));
        strategy.update_state(r).unwrap();
        // reload refills to the capacity
        assert_eq!(strategy.energy(), Energy::Finite(5));
    }

    #[test]
    fn test_strategy_rejects_bad_outcome() {
        let mut mdp = ConsMdp::new();
        mdp.new_states(2);
        let r = mdp.new_state(true);
        mdp.add_action(0, Distribution::dirac(r), "go", 1).unwrap();
        mdp.add_action(r, Distribution::dirac(r), "loop", 1).unwrap();
        let mut selector = CounterSelector::new(3);
        selector.update(0, 1, 0);

        let mut strategy =
            CounterStrategy::new(&mdp, &selector, Energy::Finite(4), Energy::Finite(2), 0);
        strategy.next_action().unwrap();
        assert_eq!(strategy.update_state(1), Err(StrategyError::InvalidOutcome(1)));
        // the strategy is still waiting for the true outcome
        strategy.update_state(r).unwrap();
        assert_eq!(strategy.current_state(), r);
        assert_eq!(strategy.energy(), Energy::Finite(4));
    }

    #[test]
    fn test_strategy_runs_out_of_energy() {
        let mut mdp = ConsMdp::new();
        mdp.new_states(2);
        mdp.add_action(0, Distribution::dirac(1), "go", 5).unwrap();
        let mut selector = CounterSelector::new(2);
        selector.update(0, 0, 0);

        let mut strategy =
            CounterStrategy::new(&mdp, &selector, Energy::Finite(9), Energy::Finite(2), 0);
        strategy.next_action().unwrap();
        assert_eq!(strategy.update_state(1), Err(StrategyError::OutOfEnergy(0)));
    }
}
