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

//! # Energy solvers for qualitative objectives
//!
//! For a CMDP, a capacity and (for the reachability objectives) a target
//! set, an [`EnergySolver`] computes for every state the minimal initial
//! energy from which a strategy can satisfy the objective, together with a
//! [`CounterSelector`] representing one such strategy. The supported
//! [`Objectives`](Objective) are:
//!
//! - **[`MinInitCons`](Objective::MinInitCons)**: reach some reload state
//!   within at least one step.
//! - **[`Safe`](Objective::Safe)**: survive forever, i.e. never run out of
//!   energy between reloads and never need more than the capacity.
//! - **[`PosReach`](Objective::PosReach)**: survive, and visit the target
//!   set with positive probability.
//! - **[`AsReach`](Objective::AsReach)**: survive, and visit the target set
//!   with probability 1.
//! - **[`Buchi`](Objective::Buchi)**: survive, and visit the target set
//!   infinitely often with probability 1.
//!
//! A state with value `∞` cannot satisfy the objective with any initial
//! load under the given capacity; that is a result, not an error.
//!
//! ## Solver variants
//!
//! - [`EnergySolver::new`] / [`EnergySolver::with_targets`]: the basic
//!   solver. Ties between actions go to the action inserted first.
//! - [`EnergySolver::goal_leaning`]: among actions with the same value,
//!   prefer the one more likely to actually move towards the target. With
//!   [`EnergySolver::goal_leaning_with_threshold`], successors below a
//!   probability threshold are ignored in a first fixpoint pass; a second
//!   pass without the threshold then guarantees the same levels as the
//!   basic solver.
//! - [`EnergySolver::least_fixpoint_safe`]: computes the survival levels by
//!   a least fixpoint from the minimal initial consumption upward. Same
//!   results; the sweep count is bounded by the maximal consumption instead
//!   of the number of states, which wins when consumptions are small.
//!
//! All results are computed lazily on the first request and cached for the
//! lifetime of the solver. The solver holds the CMDP borrowed, so the model
//! cannot be structurally modified while cached results exist.

mod fixpoint;

use crate::cmdp::{ActionId, CmdpError, ConsMdp, Energy, Rational64, StateId};
use crate::strategy::CounterSelector;
use fixpoint::{largest_fixpoint, least_fixpoint, ActionValuation, Directed, GoalLeaning, WorstCase};
use log::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The qualitative objectives an [`EnergySolver`] can compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Objective {
    /// Reach some reload state within at least one step.
    MinInitCons,
    /// Survive forever within the capacity.
    Safe,
    /// Survive and reach the target set with positive probability.
    PosReach,
    /// Survive and reach the target set with probability 1.
    AsReach,
    /// Survive and visit the target set infinitely often with probability 1.
    Buchi,
}

impl Objective {
    /// All objectives, ordered from weakest to strongest.
    pub const ALL: [Objective; 5] = [
        Objective::MinInitCons,
        Objective::Safe,
        Objective::PosReach,
        Objective::AsReach,
        Objective::Buchi,
    ];
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Objective::MinInitCons => "minimal initial consumption",
            Objective::Safe => "survival",
            Objective::PosReach => "positive reachability",
            Objective::AsReach => "almost-sure reachability",
            Objective::Buchi => "Büchi",
        };
        write!(f, "{}", name)
    }
}

/// How the reachability fixpoints rank the actions of a state.
enum ReachMode {
    /// Minimal directed value; ties go to the earlier action.
    Basic,
    /// Minimal directed value; ties go to the action with the highest
    /// probability of hitting the aimed-for successor.
    GoalLeaning { threshold: Rational64 },
}

/// How the survival levels are computed.
enum SafeVariant {
    /// Largest fixpoint with iterative elimination of unusable reloads.
    ReloadElimination,
    /// Least fixpoint from the minimal initial consumption upward.
    LeastFixpoint,
}

/// Solver for qualitative objectives on a consumption MDP.
///
/// A solver binds a CMDP, a capacity and an optional target set. Min-level
/// vectors and counter selectors are computed on first request and cached.
pub struct EnergySolver<'a> {
    mdp: &'a ConsMdp,
    cap: Energy,
    targets: BTreeSet<StateId>,
    reach: ReachMode,
    safe_variant: SafeVariant,
    min_levels: BTreeMap<Objective, Vec<Energy>>,
    selectors: BTreeMap<Objective, CounterSelector>,
}

impl<'a> EnergySolver<'a> {
    /// Create a basic solver without targets (enough for
    /// [`Objective::MinInitCons`] and [`Objective::Safe`]; the reachability
    /// objectives return `∞` everywhere when the target set is empty).
    pub fn new(mdp: &'a ConsMdp, capacity: Energy) -> Self {
        Self::build(mdp, capacity, BTreeSet::new(), ReachMode::Basic, SafeVariant::ReloadElimination)
    }

    /// Create a basic solver with a target set.
    ///
    /// Fails with [`CmdpError::UnknownState`] if a target does not exist.
    pub fn with_targets(
        mdp: &'a ConsMdp,
        capacity: Energy,
        targets: impl IntoIterator<Item = StateId>,
    ) -> Result<Self, CmdpError> {
        let targets = checked_targets(mdp, targets)?;
        Ok(Self::build(mdp, capacity, targets, ReachMode::Basic, SafeVariant::ReloadElimination))
    }

    /// Create a goal-leaning solver: among actions achieving the same
    /// minimal value, the reachability objectives prefer the action with the
    /// highest probability of hitting the successor it aims for. The levels
    /// are the same as with the basic solver; only the selectors differ.
    pub fn goal_leaning(
        mdp: &'a ConsMdp,
        capacity: Energy,
        targets: impl IntoIterator<Item = StateId>,
    ) -> Result<Self, CmdpError> {
        Self::goal_leaning_with_threshold(mdp, capacity, targets, Rational64::new(0, 1))
    }

    /// Goal-leaning solver that additionally ignores successors reached with
    /// probability below `threshold` in a first fixpoint pass. A second pass
    /// without the threshold keeps the levels equal to the basic solver's.
    pub fn goal_leaning_with_threshold(
        mdp: &'a ConsMdp,
        capacity: Energy,
        targets: impl IntoIterator<Item = StateId>,
        threshold: Rational64,
    ) -> Result<Self, CmdpError> {
        let targets = checked_targets(mdp, targets)?;
        Ok(Self::build(
            mdp,
            capacity,
            targets,
            ReachMode::GoalLeaning { threshold },
            SafeVariant::ReloadElimination,
        ))
    }

    /// Create a solver that computes the survival levels by a least
    /// fixpoint from the minimal initial consumption upward. Preferable when
    /// the maximal consumption of an action is small compared to the number
    /// of states.
    pub fn least_fixpoint_safe(
        mdp: &'a ConsMdp,
        capacity: Energy,
        targets: impl IntoIterator<Item = StateId>,
    ) -> Result<Self, CmdpError> {
        let targets = checked_targets(mdp, targets)?;
        Ok(Self::build(mdp, capacity, targets, ReachMode::Basic, SafeVariant::LeastFixpoint))
    }

    fn build(
        mdp: &'a ConsMdp,
        cap: Energy,
        targets: BTreeSet<StateId>,
        reach: ReachMode,
        safe_variant: SafeVariant,
    ) -> Self {
        Self {
            mdp,
            cap,
            targets,
            reach,
            safe_variant,
            min_levels: BTreeMap::new(),
            selectors: BTreeMap::new(),
        }
    }

    /// The capacity this solver was created with.
    pub fn capacity(&self) -> Energy {
        self.cap
    }

    /// The target set this solver was created with.
    pub fn targets(&self) -> &BTreeSet<StateId> {
        &self.targets
    }

    /// The minimal energy levels needed to satisfy `objective`, indexed by
    /// state. `∞` means the objective cannot be satisfied from that state
    /// under this capacity.
    pub fn min_levels(&mut self, objective: Objective) -> &[Energy] {
        self.ensure_computed(objective);
        &self.min_levels[&objective]
    }

    /// A counter selector that satisfies `objective` when started in a state
    /// `s` with at least `min_levels(objective)[s]` energy.
    pub fn selector(&mut self, objective: Objective) -> &CounterSelector {
        self.ensure_computed(objective);
        &self.selectors[&objective]
    }

    fn ensure_computed(&mut self, objective: Objective) {
        if self.min_levels.contains_key(&objective) {
            return;
        }
        match objective {
            Objective::Safe => {
                if let SafeVariant::LeastFixpoint = self.safe_variant {
                    self.ensure_computed(Objective::MinInitCons);
                }
            }
            Objective::PosReach | Objective::AsReach => self.ensure_computed(Objective::Safe),
            _ => {}
        }
        info!("computing {} levels for {} states", objective, self.mdp.num_states());
        let (levels, selector) = match objective {
            Objective::MinInitCons => self.compute_min_init_cons(),
            Objective::Safe => match self.safe_variant {
                SafeVariant::ReloadElimination => self.compute_safe(),
                SafeVariant::LeastFixpoint => self.compute_safe_least(),
            },
            Objective::PosReach => self.compute_pos_reach(),
            Objective::AsReach => self.compute_as_reach(),
            Objective::Buchi => self.compute_buchi(),
        };
        self.min_levels.insert(objective, levels);
        self.selectors.insert(objective, selector);
    }

    /// Reloads with a value within the capacity count as 0, anything above
    /// the capacity as `∞`.
    fn reload_capper(&self, state: StateId, value: Energy) -> Energy {
        if value.is_infinite() || value > self.cap {
            return Energy::INF;
        }
        if self.mdp.is_reload(state) {
            return Energy::ZERO;
        }
        value
    }

    /// Minimal energy to reach some reload within at least one step: one
    /// largest fixpoint with reloads counting as 0.
    fn compute_min_init_cons(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let mut values = vec![Energy::INF; num_states];
        let mut selector = CounterSelector::new(num_states);
        let valuation =
            WorstCase { zero_cond: |s: StateId, _: &[Energy]| self.mdp.is_reload(s) };
        largest_fixpoint(
            self.mdp,
            &mut values,
            &valuation,
            |_, v| if v > self.cap { Energy::INF } else { v },
            |_| false,
            |s, v, a| selector.update(s, v, a),
        );
        (values, selector)
    }

    /// Survival levels by reload elimination.
    fn compute_safe(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let mut values = vec![Energy::INF; num_states];
        let mut removed = BTreeSet::new();
        let mut selector = CounterSelector::new(num_states);
        self.sufficient_levels(&mut values, &mut removed, |_| Energy::INF, &mut selector);
        (values, selector)
    }

    /// Survival levels by a least fixpoint from MinInitCons upward.
    ///
    /// The zero condition is dynamic: a reload only counts as "free" while
    /// its own current value still fits the capacity. Reloads that grow past
    /// the capacity become `∞` and lose that privilege, which plays the same
    /// role as the explicit reload elimination in [`Self::compute_safe`].
    fn compute_safe_least(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let mut values = self.min_levels[&Objective::MinInitCons].clone();
        let valuation = WorstCase {
            zero_cond: |s: StateId, vals: &[Energy]| {
                self.mdp.is_reload(s) && vals[s].within(self.cap)
            },
        };
        least_fixpoint(self.mdp, &mut values, &valuation, |_, v| {
            if v > self.cap {
                Energy::INF
            } else {
                v
            }
        });

        // one extra sweep over the converged values to extract a selector
        let mut selector = CounterSelector::new(num_states);
        for s in 0..num_states {
            if values[s].is_infinite() {
                continue;
            }
            let mut best: Option<(ActionId, Energy)> = None;
            for (aid, action) in self.mdp.actions_for(s) {
                let value = valuation.evaluate(action, &values);
                match best {
                    Some((_, incumbent)) if value >= incumbent => {}
                    _ => best = Some((aid, value)),
                }
            }
            if let Some((aid, value)) = best {
                if let Energy::Finite(v) = value {
                    if Energy::Finite(v) <= self.cap {
                        selector.update(s, v, aid);
                    }
                }
            }
        }

        for s in 0..num_states {
            if self.mdp.is_reload(s) && values[s].within(self.cap) {
                values[s] = Energy::ZERO;
            }
        }
        (values, selector)
    }

    /// Positive reachability: one largest fixpoint of the directed action
    /// value, with targets pinned to their survival level.
    fn compute_pos_reach(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let safe = &self.min_levels[&Objective::Safe];
        let targets = &self.targets;

        let mut values = vec![Energy::INF; num_states];
        for &t in targets {
            values[t] = safe[t];
        }
        let mut selector = CounterSelector::new(num_states);
        self.reach_fixpoint(&mut values, safe, |s| targets.contains(&s), &mut selector);

        // once a target is reached, survival takes over
        selector.copy_values_from(&self.selectors[&Objective::Safe], targets.iter().copied());
        (values, selector)
    }

    /// Almost-sure reachability: iterate a positive-reachability-style
    /// fixpoint, eliminating reloads the strategy cannot rely on.
    ///
    /// The survival vector of each round is recomputed on the pruned MDP,
    /// with targets pre-loaded by their full survival level: after reaching
    /// the target set, all reloads are available again.
    fn compute_as_reach(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let safe = &self.min_levels[&Objective::Safe];
        let targets = &self.targets;

        let mut removed = BTreeSet::new();
        let mut survival = vec![Energy::INF; num_states];
        let mut survival_selector = CounterSelector::new(num_states);
        let mut selector = CounterSelector::new(num_states);
        loop {
            self.sufficient_levels(
                &mut survival,
                &mut removed,
                |s| if targets.contains(&s) { safe[s] } else { Energy::INF },
                &mut survival_selector,
            );

            let mut values = vec![Energy::INF; num_states];
            for &t in targets {
                values[t] = safe[t];
            }
            selector.reset(num_states);
            self.reach_fixpoint(
                &mut values,
                &survival,
                |s| removed.contains(&s) || targets.contains(&s),
                &mut selector,
            );
            selector.copy_values_from(&self.selectors[&Objective::Safe], targets.iter().copied());

            let unusable: Vec<StateId> = (0..num_states)
                .filter(|&s| {
                    self.mdp.is_reload(s) && values[s].is_infinite() && !removed.contains(&s)
                })
                .collect();
            if unusable.is_empty() {
                return (values, selector);
            }
            debug!("almost-sure strategies cannot rely on reloads {:?}", unusable);
            removed.extend(unusable);
        }
    }

    /// Büchi: like almost-sure reachability, but reaching a target does not
    /// finish the task, so targets are pinned to the survival levels of the
    /// *pruned* MDP instead of the full one.
    fn compute_buchi(&self) -> (Vec<Energy>, CounterSelector) {
        let num_states = self.mdp.num_states();
        let targets = &self.targets;

        let mut removed = BTreeSet::new();
        let mut survival = vec![Energy::INF; num_states];
        let mut survival_selector = CounterSelector::new(num_states);
        let mut selector = CounterSelector::new(num_states);
        loop {
            self.sufficient_levels(
                &mut survival,
                &mut removed,
                |_| Energy::INF,
                &mut survival_selector,
            );

            let mut values = vec![Energy::INF; num_states];
            for &t in targets {
                values[t] = survival[t];
            }
            selector.reset(num_states);
            self.reach_fixpoint(
                &mut values,
                &survival,
                |s| removed.contains(&s) || targets.contains(&s),
                &mut selector,
            );
            selector.copy_values_from(&survival_selector, targets.iter().copied());

            let unusable: Vec<StateId> = (0..num_states)
                .filter(|&s| {
                    self.mdp.is_reload(s) && values[s].is_infinite() && !removed.contains(&s)
                })
                .collect();
            if unusable.is_empty() {
                return (values, selector);
            }
            debug!("Büchi strategies cannot rely on reloads {:?}", unusable);
            removed.extend(unusable);
        }
    }

    /// Survival levels with reload elimination, parameterized by the value
    /// each state is re-initialized to at the start of every round.
    ///
    /// With the default `init_val = ∞` this computes "survive forever in the
    /// MDP without the removed reloads". With `init_val` finite on some
    /// states it computes "survive, or reach one of those states with at
    /// least that much energy". Reloads that end a round at `∞` cannot
    /// sustain the play; they are added to `removed` and the round is
    /// repeated. Good reloads are zeroed at the end.
    fn sufficient_levels<I>(
        &self,
        values: &mut Vec<Energy>,
        removed: &mut BTreeSet<StateId>,
        init_val: I,
        selector: &mut CounterSelector,
    ) where
        I: Fn(StateId) -> Energy,
    {
        let num_states = self.mdp.num_states();
        loop {
            selector.reset(num_states);
            for s in 0..num_states {
                values[s] = init_val(s);
            }

            let valuation = WorstCase {
                zero_cond: |s: StateId, _: &[Energy]| {
                    self.mdp.is_reload(s) && !removed.contains(&s)
                },
            };
            largest_fixpoint(
                self.mdp,
                values,
                &valuation,
                |_, v| if v > self.cap { Energy::INF } else { v },
                |s| removed.contains(&s),
                |s, v, a| selector.update(s, v, a),
            );

            let unusable: Vec<StateId> = (0..num_states)
                .filter(|&s| {
                    self.mdp.is_reload(s) && values[s].is_infinite() && !removed.contains(&s)
                })
                .collect();
            if unusable.is_empty() {
                break;
            }
            debug!("eliminating reloads that cannot sustain the play: {:?}", unusable);
            removed.extend(unusable);
        }

        // finite reloads are good: entering them refills the tank
        for s in 0..num_states {
            if self.mdp.is_reload(s) && values[s].within(self.cap) {
                values[s] = Energy::ZERO;
            }
        }
    }

    /// One reachability fixpoint in the configured mode. With a positive
    /// goal-leaning threshold, the fixpoint runs twice: first ignoring
    /// unlikely successors, then without the threshold so that the levels
    /// never exceed the basic solver's.
    fn reach_fixpoint<S>(
        &self,
        values: &mut [Energy],
        survival: &[Energy],
        skip: S,
        selector: &mut CounterSelector,
    ) where
        S: Fn(StateId) -> bool + Copy,
    {
        match &self.reach {
            ReachMode::Basic => {
                let valuation = Directed { survival };
                largest_fixpoint(
                    self.mdp,
                    values,
                    &valuation,
                    |s, v| self.reload_capper(s, v),
                    |s| skip(s),
                    |s, v, a| selector.update(s, v, a),
                );
            }
            ReachMode::GoalLeaning { threshold } => {
                let valuation = GoalLeaning { survival, threshold: *threshold };
                largest_fixpoint(
                    self.mdp,
                    values,
                    &valuation,
                    |s, v| self.reload_capper(s, v),
                    |s| skip(s),
                    |s, v, a| selector.update(s, v, a),
                );
                if *threshold > Rational64::new(0, 1) {
                    let valuation = GoalLeaning { survival, threshold: Rational64::new(0, 1) };
                    largest_fixpoint(
                        self.mdp,
                        values,
                        &valuation,
                        |s, v| self.reload_capper(s, v),
                        |s| skip(s),
                        |s, v, a| selector.update(s, v, a),
                    );
                }
            }
        }
    }
}

fn checked_targets(
    mdp: &ConsMdp,
    targets: impl IntoIterator<Item = StateId>,
) -> Result<BTreeSet<StateId>, CmdpError> {
    let targets: BTreeSet<StateId> = targets.into_iter().collect();
    if let Some(&bad) = targets.iter().find(|&&t| t >= mdp.num_states()) {
        return Err(CmdpError::UnknownState(bad));
    }
    Ok(targets)
}
