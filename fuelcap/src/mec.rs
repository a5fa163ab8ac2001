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

//! # Maximal end-component decomposition
//!
//! An end-component is a set of states that is closed under at least one
//! action per state and strongly connected in the induced successor graph;
//! once inside, a strategy can keep the play there forever. This module
//! computes the *maximal* end-components of a CMDP, ignoring consumption.
//!
//! The decomposition repeats two steps on the induced graph until it is
//! empty: emit every bottom, non-trivial SCC as a MEC, then delete the
//! probabilistic attractor of everything removed so far. The attractor
//! contains exactly the states that cannot avoid the removed part whatever
//! the strategy does, so no later MEC can use them.

use crate::cmdp::{ConsMdp, StateId};
use log::*;
use petgraph::prelude::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{BTreeSet, HashMap};

/// Compute the maximal end-components of the CMDP, ignoring consumption.
///
/// Returns the MECs as sets of states, in the order they were discovered.
/// Every state belongs to at most one MEC; states that cannot stay in any
/// end-component forever belong to none.
pub fn mec_decompose(mdp: &ConsMdp) -> Vec<BTreeSet<StateId>> {
    let mut graph: StableDiGraph<StateId, ()> = StableDiGraph::new();
    for s in 0..mdp.num_states() {
        graph.add_node(s);
    }
    // node index == state id, and stays that way: nodes are only removed
    for s in 0..mdp.num_states() {
        for t in mdp.state_succs(s) {
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
        }
    }

    let mut mecs: Vec<BTreeSet<StateId>> = Vec::new();
    let mut removed: BTreeSet<StateId> = BTreeSet::new();
    while graph.node_count() > 0 {
        let mut emitted = removed.clone();
        for scc in strongly_connected(&graph) {
            if is_bottom(&graph, &scc) && !is_trivial(&graph, &scc) {
                let mec: BTreeSet<StateId> = scc.iter().map(|n| n.index()).collect();
                debug!("found maximal end-component {:?}", mec);
                emitted.extend(mec.iter().copied());
                mecs.push(mec);
            }
        }

        let attractor = probabilistic_attractor(mdp, emitted);
        for &s in attractor.difference(&removed) {
            graph.remove_node(NodeIndex::new(s));
        }
        removed = attractor;
    }

    mecs
}

/// The set of states that cannot avoid `attractor` regardless of the action
/// choice: iteratively add every state all of whose actions may move into
/// the set (dead ends included, vacuously).
fn probabilistic_attractor(mdp: &ConsMdp, mut attractor: BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut repeat = true;
    while repeat {
        repeat = false;
        for s in 0..mdp.num_states() {
            if attractor.contains(&s) {
                continue;
            }
            let can_avoid = mdp
                .actions_for(s)
                .any(|(_, a)| a.distr.successors().all(|t| !attractor.contains(&t)));
            if !can_avoid {
                attractor.insert(s);
                repeat = true;
            }
        }
    }
    attractor
}

/// No edge leaves the SCC.
fn is_bottom(graph: &StableDiGraph<StateId, ()>, scc: &[NodeIndex]) -> bool {
    scc.iter().all(|&v| graph.neighbors(v).all(|t| scc.contains(&t)))
}

/// A single state without a self-loop (and thus without any cycle).
fn is_trivial(graph: &StableDiGraph<StateId, ()>, scc: &[NodeIndex]) -> bool {
    scc.iter().all(|&v| graph.neighbors(v).all(|t| !scc.contains(&t)))
}

/// Tarjan's strongly connected components with an explicit stack, so deep
/// graphs cannot overflow the call stack.
fn strongly_connected(graph: &StableDiGraph<StateId, ()>) -> Vec<Vec<NodeIndex>> {
    let adjacency: HashMap<NodeIndex, Vec<NodeIndex>> =
        graph.node_indices().map(|v| (v, graph.neighbors(v).collect())).collect();

    let mut index: HashMap<NodeIndex, usize> = HashMap::new();
    let mut lowlink: HashMap<NodeIndex, usize> = HashMap::new();
    let mut on_stack: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut stack: Vec<NodeIndex> = Vec::new();
    let mut sccs: Vec<Vec<NodeIndex>> = Vec::new();
    let mut next_index = 0usize;

    let mut roots: Vec<NodeIndex> = graph.node_indices().collect();
    roots.sort();
    for root in roots {
        if index.contains_key(&root) {
            continue;
        }
        // frame: (node, position of the next neighbor to visit)
        let mut frames: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        index.insert(root, next_index);
        lowlink.insert(root, next_index);
        next_index += 1;
        stack.push(root);
        on_stack.insert(root);

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            let pos = frame.1;
            let neighbors = &adjacency[&v];
            if pos < neighbors.len() {
                frame.1 += 1;
                let w = neighbors[pos];
                if !index.contains_key(&w) {
                    index.insert(w, next_index);
                    lowlink.insert(w, next_index);
                    next_index += 1;
                    stack.push(w);
                    on_stack.insert(w);
                    frames.push((w, 0));
                } else if on_stack.contains(&w) {
                    let low = lowlink[&v].min(index[&w]);
                    lowlink.insert(v, low);
                }
            } else {
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    let low = lowlink[&parent].min(lowlink[&v]);
                    lowlink.insert(parent, low);
                }
                if lowlink[&v] == index[&v] {
                    let mut scc = Vec::new();
                    while let Some(w) = stack.pop() {
                        on_stack.remove(&w);
                        scc.push(w);
                        if w == v {
                            break;
                        }
                    }
                    sccs.push(scc);
                }
            }
        }
    }
    sccs
}
