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

//! # JSON import and export of CMDPs
//!
//! The document format lists states and actions:
//!
//! ```json
//! {
//!   "states": [
//!     {"name": "base", "reload": true},
//!     {"target": true}
//!   ],
//!   "actions": [
//!     {
//!       "src": 0,
//!       "label": "go",
//!       "consumption": 2,
//!       "distribution": {"0": "1/2", "1": "1/2"}
//!     }
//!   ]
//! }
//! ```
//!
//! States are implicitly numbered by their position. Probabilities are
//! written as rational strings (`"1/2"`, `"1"`), never as floats, so
//! importing and re-exporting preserves the model exactly up to formatting.
//! The optional `target` markers carry the target set alongside the model.

use crate::cmdp::{CmdpError, ConsMdp, Distribution, Rational64, StateId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Import and export errors
#[derive(Error, Debug)]
pub enum IoError {
    /// The document is not valid JSON (or misses required fields).
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A probability is not a valid rational string.
    #[error("{0:?} is not a rational probability")]
    InvalidProbability(String),
    /// The document describes an invalid CMDP.
    #[error("Invalid model: {0}")]
    InvalidModel(#[from] CmdpError),
}

#[derive(Serialize, Deserialize)]
struct JsonState {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    reload: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    target: bool,
}

#[derive(Serialize, Deserialize)]
struct JsonAction {
    src: StateId,
    label: String,
    #[serde(default)]
    consumption: u32,
    distribution: BTreeMap<StateId, String>,
}

#[derive(Serialize, Deserialize)]
struct JsonCmdp {
    states: Vec<JsonState>,
    actions: Vec<JsonAction>,
}

/// Parse a CMDP (and its target set) from a JSON document.
pub fn from_json(document: &str) -> Result<(ConsMdp, BTreeSet<StateId>), IoError> {
    let doc: JsonCmdp = serde_json::from_str(document)?;

    let mut mdp = ConsMdp::new();
    let mut targets = BTreeSet::new();
    for (sid, state) in doc.states.iter().enumerate() {
        match &state.name {
            Some(name) => {
                mdp.new_state_named(state.reload, name)?;
            }
            None => {
                mdp.new_state(state.reload);
            }
        }
        if state.target {
            targets.insert(sid);
        }
    }

    for action in &doc.actions {
        let mut pairs = Vec::with_capacity(action.distribution.len());
        for (&succ, prob) in &action.distribution {
            let p: Rational64 = prob
                .parse()
                .map_err(|_| IoError::InvalidProbability(prob.clone()))?;
            pairs.push((succ, p));
        }
        let distr = Distribution::new(pairs)?;
        mdp.add_action(action.src, distr, action.label.as_str(), action.consumption)?;
    }

    Ok((mdp, targets))
}

/// Serialize a CMDP and a target set to a JSON document.
///
/// The round trip through [`from_json`] yields a semantically identical
/// model: same states, same reload and target markers, same actions in the
/// same order.
pub fn to_json(mdp: &ConsMdp, targets: &BTreeSet<StateId>) -> Result<String, IoError> {
    let states = (0..mdp.num_states())
        .map(|s| JsonState {
            name: mdp.name_of(s).map(|n| n.to_string()),
            reload: mdp.is_reload(s),
            target: targets.contains(&s),
        })
        .collect();
    let actions = (0..mdp.num_states())
        .flat_map(|s| mdp.actions_for(s))
        .map(|(_, a)| JsonAction {
            src: a.src,
            label: a.label.clone(),
            consumption: a.cons,
            distribution: a.distr.pairs().map(|(t, p)| (t, p.to_string())).collect(),
        })
        .collect();
    let doc = JsonCmdp { states, actions };
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmdp::Energy;
    use crate::solvers::{EnergySolver, Objective};

    const DOC: &str = r#"{
        "states": [
            {"name": "depot", "reload": true},
            {},
            {"target": true}
        ],
        "actions": [
            {"src": 0, "label": "out", "consumption": 1,
             "distribution": {"1": "1/2", "2": "1/2"}},
            {"src": 1, "label": "back", "consumption": 1, "distribution": {"0": "1"}},
            {"src": 2, "label": "stay", "consumption": 1, "distribution": {"2": "1"}}
        ]
    }"#;

    #[test]
    fn test_import() {
        let (mdp, targets) = from_json(DOC).unwrap();
        assert_eq!(mdp.num_states(), 3);
        assert!(mdp.is_reload(0));
        assert!(!mdp.is_reload(1));
        assert_eq!(mdp.state_with_name("depot"), Some(0));
        assert_eq!(targets, [2].iter().copied().collect());
        let (_, out) = mdp.actions_for(0).next().unwrap();
        assert_eq!(out.label, "out");
        assert_eq!(out.cons, 1);
        assert_eq!(out.distr.len(), 2);
    }

    #[test]
    fn test_round_trip_is_semantically_equal() {
        let (mdp, targets) = from_json(DOC).unwrap();
        let exported = to_json(&mdp, &targets).unwrap();
        let (back, back_targets) = from_json(&exported).unwrap();
        assert_eq!(targets, back_targets);
        assert_eq!(mdp.num_states(), back.num_states());
        // same solver results on both models
        let mut s1 = EnergySolver::with_targets(&mdp, Energy::Finite(10), targets.clone()).unwrap();
        let mut s2 =
            EnergySolver::with_targets(&back, Energy::Finite(10), back_targets.clone()).unwrap();
        for &objective in &Objective::ALL {
            assert_eq!(s1.min_levels(objective), s2.min_levels(objective));
        }
    }

    #[test]
    fn test_rejects_bad_probability() {
        let doc = r#"{"states": [{}], "actions":
            [{"src": 0, "label": "a", "distribution": {"0": "0.5"}}]}"#;
        assert!(matches!(from_json(doc), Err(IoError::InvalidProbability(_))));
    }

    #[test]
    fn test_rejects_bad_distribution() {
        let doc = r#"{"states": [{}], "actions":
            [{"src": 0, "label": "a", "distribution": {"0": "1/2"}}]}"#;
        assert!(matches!(from_json(doc), Err(IoError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_unknown_state() {
        let doc = r#"{"states": [{}], "actions":
            [{"src": 3, "label": "a", "distribution": {"0": "1"}}]}"#;
        assert!(matches!(
            from_json(doc),
            Err(IoError::InvalidModel(CmdpError::UnknownState(3)))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(from_json("not json"), Err(IoError::Malformed(_))));
    }
}
