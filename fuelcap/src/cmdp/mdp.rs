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

//! # The consumption MDP store
//!
//! A [`ConsMdp`] is built incrementally: create states with
//! [`ConsMdp::new_state`], mark reloads, and connect them with
//! [`ConsMdp::add_action`]. Actions of one state are iterated in insertion
//! order, and that order is observable: the fixpoint solvers break ties by
//! it, so two runs over the same construction sequence produce the same
//! selectors.
//!
//! ## Implementation details
//!
//! Actions live in one arena (`Vec<Option<ActionData>>`) indexed by
//! [`ActionId`], so action ids stay stable when other actions are removed.
//! Removal tombstones the arena slot and unlinks the id from the per-state
//! list. Per-state lists only ever hold live ids.
//!
//! Solvers borrow the `ConsMdp` immutably for their whole lifetime. All
//! structural edits take `&mut self`, so the borrow checker rules out editing
//! a CMDP while any solver still holds cached results for it.

use super::distribution::Distribution;
use super::types::{ActionId, CmdpError, StateId};
use std::collections::{BTreeSet, HashMap};

/// Holds the data of one action of a consumption MDP.
///
/// An action is defined by its source state, its (non-negative integer)
/// consumption, the probability distribution over its successors, and a
/// label that is unique among the actions of the source state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionData {
    /// The state this action belongs to.
    pub src: StateId,
    /// Energy consumed by playing this action.
    pub cons: u32,
    /// Distribution over the successor states.
    pub distr: Distribution,
    /// Label, unique per source state.
    pub label: String,
}

/// Per-state data: display name, reload flag, and the outgoing actions in
/// insertion order.
#[derive(Clone, Debug, Default)]
struct StateData {
    name: Option<String>,
    reload: bool,
    actions: Vec<ActionId>,
}

/// A Markov decision process with consumption on actions.
///
/// States are identified by zero-based [`StateId`]s, actions by the
/// [`ActionId`] returned from [`ConsMdp::add_action`]. Reloading is a state
/// property: entering a reload state refills the energy to the capacity of
/// whatever controller is running.
#[derive(Clone, Debug, Default)]
pub struct ConsMdp {
    states: Vec<StateData>,
    actions: Vec<Option<ActionData>>,
    names: HashMap<String, StateId>,
}

impl ConsMdp {
    /// Create an empty CMDP.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Add a new state and return its id.
    pub fn new_state(&mut self, reload: bool) -> StateId {
        let sid = self.states.len();
        self.states.push(StateData { name: None, reload, actions: Vec::new() });
        sid
    }

    /// Add a new named state and return its id.
    ///
    /// Fails with [`CmdpError::DuplicateName`] if a state with this name
    /// already exists.
    pub fn new_state_named(&mut self, reload: bool, name: &str) -> Result<StateId, CmdpError> {
        if let Some(&existing) = self.names.get(name) {
            return Err(CmdpError::DuplicateName(name.to_string(), existing));
        }
        let sid = self.new_state(reload);
        self.states[sid].name = Some(name.to_string());
        self.names.insert(name.to_string(), sid);
        Ok(sid)
    }

    /// Add `count` unnamed non-reload states, returning the range of new ids.
    pub fn new_states(&mut self, count: usize) -> std::ops::Range<StateId> {
        let start = self.states.len();
        for _ in 0..count {
            self.new_state(false);
        }
        start..self.states.len()
    }

    /// Set or clear the reload flag of a state.
    pub fn set_reload(&mut self, state: StateId, reload: bool) -> Result<(), CmdpError> {
        self.check_state(state)?;
        self.states[state].reload = reload;
        Ok(())
    }

    /// Returns the reload status of a state.
    ///
    /// **Panics** if the state does not exist.
    pub fn is_reload(&self, state: StateId) -> bool {
        self.states[state].reload
    }

    /// The name of a state, if it has one.
    ///
    /// **Panics** if the state does not exist.
    pub fn name_of(&self, state: StateId) -> Option<&str> {
        self.states[state].name.as_deref()
    }

    /// The id of the state with the given name, if any.
    pub fn state_with_name(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    /// Add an action and return its id.
    ///
    /// Fails with [`CmdpError::UnknownState`] if the source or any successor
    /// does not exist, and with [`CmdpError::DuplicateLabel`] if `src`
    /// already has an action with the same label.
    pub fn add_action(
        &mut self,
        src: StateId,
        distr: Distribution,
        label: impl Into<String>,
        cons: u32,
    ) -> Result<ActionId, CmdpError> {
        let label = label.into();
        self.check_state(src)?;
        for succ in distr.successors() {
            self.check_state(succ)?;
        }
        if self.actions_for(src).any(|(_, a)| a.label == label) {
            return Err(CmdpError::DuplicateLabel(src, label));
        }
        let aid = self.actions.len();
        self.actions.push(Some(ActionData { src, cons, distr, label }));
        self.states[src].actions.push(aid);
        Ok(aid)
    }

    /// Remove an action by its id.
    ///
    /// Fails with [`CmdpError::InvalidActionId`] if the id was never issued
    /// or the action was already removed. The insertion order of the
    /// remaining actions of the same source is preserved.
    pub fn remove_action(&mut self, action: ActionId) -> Result<(), CmdpError> {
        let src = match self.actions.get(action) {
            Some(Some(a)) => a.src,
            _ => return Err(CmdpError::InvalidActionId(action)),
        };
        self.actions[action] = None;
        self.states[src].actions.retain(|&aid| aid != action);
        Ok(())
    }

    /// Look up an action by its id. Returns `None` for removed actions.
    pub fn action(&self, action: ActionId) -> Option<&ActionData> {
        self.actions.get(action).and_then(|slot| slot.as_ref())
    }

    /// Iterate over the actions of a state in insertion order.
    ///
    /// **Panics** if the state does not exist.
    pub fn actions_for(&self, state: StateId) -> ActionsFor<'_> {
        ActionsFor { mdp: self, ids: self.states[state].actions.iter() }
    }

    /// The successors of a state over all of its actions.
    ///
    /// **Panics** if the state does not exist.
    pub fn state_succs(&self, state: StateId) -> BTreeSet<StateId> {
        self.actions_for(state).flat_map(|(_, a)| a.distr.successors()).collect()
    }

    fn check_state(&self, state: StateId) -> Result<(), CmdpError> {
        if state < self.states.len() {
            Ok(())
        } else {
            Err(CmdpError::UnknownState(state))
        }
    }
}

/// Iterator over the live actions of one state, in insertion order.
#[derive(Clone, Debug)]
pub struct ActionsFor<'a> {
    mdp: &'a ConsMdp,
    ids: std::slice::Iter<'a, ActionId>,
}

impl<'a> Iterator for ActionsFor<'a> {
    type Item = (ActionId, &'a ActionData);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = *self.ids.next()?;
            if let Some(action) = self.mdp.actions[id].as_ref() {
                return Some((id, action));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_rational::Rational64;

    fn half() -> Rational64 {
        Rational64::new(1, 2)
    }

    #[test]
    fn test_build_states() {
        let mut mdp = ConsMdp::new();
        let s0 = mdp.new_state(true);
        let s1 = mdp.new_state_named(false, "corner").unwrap();
        assert_eq!((s0, s1), (0, 1));
        assert_eq!(mdp.num_states(), 2);
        assert!(mdp.is_reload(0));
        assert!(!mdp.is_reload(1));
        assert_eq!(mdp.state_with_name("corner"), Some(1));
        assert_eq!(mdp.name_of(1), Some("corner"));
        assert_eq!(mdp.new_states(3), 2..5);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut mdp = ConsMdp::new();
        mdp.new_state_named(false, "base").unwrap();
        assert_eq!(
            mdp.new_state_named(true, "base"),
            Err(CmdpError::DuplicateName("base".to_string(), 0)),
        );
    }

    #[test]
    fn test_add_action_contracts() {
        let mut mdp = ConsMdp::new();
        mdp.new_states(2);
        mdp.add_action(0, Distribution::dirac(1), "a", 1).unwrap();
        // same label on the same state
        assert_eq!(
            mdp.add_action(0, Distribution::dirac(0), "a", 2),
            Err(CmdpError::DuplicateLabel(0, "a".to_string())),
        );
        // same label on another state is fine
        mdp.add_action(1, Distribution::dirac(0), "a", 1).unwrap();
        // unknown source and unknown successor
        assert_eq!(
            mdp.add_action(7, Distribution::dirac(0), "b", 0),
            Err(CmdpError::UnknownState(7)),
        );
        assert_eq!(
            mdp.add_action(0, Distribution::dirac(9), "b", 0),
            Err(CmdpError::UnknownState(9)),
        );
    }

    #[test]
    fn test_action_order_and_removal() {
        let mut mdp = ConsMdp::new();
        mdp.new_states(3);
        let a = mdp.add_action(0, Distribution::dirac(1), "a", 1).unwrap();
        let b = mdp.add_action(0, Distribution::dirac(2), "b", 2).unwrap();
        let c = mdp.add_action(0, Distribution::dirac(0), "c", 3).unwrap();

        let labels: Vec<&str> =
            mdp.actions_for(0).map(|(_, act)| act.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        mdp.remove_action(b).unwrap();
        let ids: Vec<ActionId> = mdp.actions_for(0).map(|(aid, _)| aid).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(mdp.action(b).is_none());

        // removing twice fails
        assert_eq!(mdp.remove_action(b), Err(CmdpError::InvalidActionId(b)));
        assert_eq!(mdp.remove_action(99), Err(CmdpError::InvalidActionId(99)));

        // the label is free again
        mdp.add_action(0, Distribution::dirac(1), "b", 2).unwrap();
        let labels: Vec<&str> =
            mdp.actions_for(0).map(|(_, act)| act.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_state_succs() {
        let mut mdp = ConsMdp::new();
        mdp.new_states(4);
        let d = Distribution::new(vec![(1, half()), (2, half())]).unwrap();
        mdp.add_action(0, d, "a", 1).unwrap();
        mdp.add_action(0, Distribution::dirac(3), "b", 1).unwrap();
        let succs: Vec<StateId> = mdp.state_succs(0).into_iter().collect();
        assert_eq!(succs, vec![1, 2, 3]);
        assert!(mdp.state_succs(3).is_empty());
    }
}
