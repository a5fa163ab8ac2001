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

//! Thin command line wrapper around the `fuelcap` library: load a CMDP from
//! JSON, run an objective or the capacity search, print the result.
//!
//! Exit codes: 0 on success, 2 on ill-formed input, 3 when the objective is
//! unsatisfiable within the capacity (or the capacity search fails).

use fuelcap::cmdp::{ConsMdp, Energy, StateId};
use fuelcap::io::from_json;
use fuelcap::min_capacity;
use fuelcap::solvers::{EnergySolver, Objective};
use fuelcap::Error;

use clap::{Parser, Subcommand};
use log::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::exit;

const EXIT_BAD_INPUT: i32 = 2;
const EXIT_UNSATISFIABLE: i32 = 3;

#[derive(Parser)]
#[command(name = "fuelcap_main", about = "Controller synthesis for consumption MDPs")]
struct CommandLineArguments {
    #[command(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand)]
enum MainCommand {
    /// Compute the minimal energy levels for one objective
    Solve {
        /// JSON file describing the CMDP (with reload and target markers)
        #[arg(long)]
        model: PathBuf,
        /// One of: min-init-cons, safe, pos-reach, as-reach, buchi
        #[arg(long)]
        objective: String,
        /// Energy capacity (a positive integer, or "inf")
        #[arg(long)]
        capacity: String,
        /// Optional initial state (id or name); decides the exit code
        #[arg(long)]
        initial: Option<String>,
    },
    /// Search the minimal capacity sufficient for an objective
    Mincap {
        /// JSON file describing the CMDP (with reload and target markers)
        #[arg(long)]
        model: PathBuf,
        /// Initial state (id or name)
        #[arg(long)]
        initial: String,
        /// One of: as-reach, buchi
        #[arg(long)]
        objective: String,
        /// Upper end of the searched capacity range
        #[arg(long, default_value_t = fuelcap::mincap::DEFAULT_STARTING_CAPACITY)]
        starting_capacity: u32,
        /// Only accept capacities needing at most this initial load
        #[arg(long)]
        max_starting_load: Option<u32>,
    },
}

fn main() {
    pretty_env_logger::init();
    let args = CommandLineArguments::parse();

    let code = match args.cmd {
        MainCommand::Solve { model, objective, capacity, initial } => {
            solve(&model, &objective, &capacity, initial.as_deref())
        }
        MainCommand::Mincap { model, initial, objective, starting_capacity, max_starting_load } => {
            mincap(&model, &initial, &objective, starting_capacity, max_starting_load)
        }
    };
    exit(code);
}

fn solve(model: &PathBuf, objective: &str, capacity: &str, initial: Option<&str>) -> i32 {
    let (mdp, targets) = match load_model(model) {
        Some(loaded) => loaded,
        None => return EXIT_BAD_INPUT,
    };
    let objective = match parse_objective(objective) {
        Some(o) => o,
        None => {
            error!("unknown objective {:?}", objective);
            return EXIT_BAD_INPUT;
        }
    };
    let capacity: Energy = match capacity.parse() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return EXIT_BAD_INPUT;
        }
    };
    let initial = match initial {
        Some(text) => match resolve_state(&mdp, text) {
            Some(s) => Some(s),
            None => {
                error!("unknown state {:?}", text);
                return EXIT_BAD_INPUT;
            }
        },
        None => None,
    };

    let mut solver = match EnergySolver::with_targets(&mdp, capacity, targets) {
        Ok(solver) => solver,
        Err(e) => {
            error!("{}", e);
            return EXIT_BAD_INPUT;
        }
    };
    info!("computing {} with capacity {}", objective, capacity);
    let levels = solver.min_levels(objective);
    for (s, level) in levels.iter().enumerate() {
        match mdp.name_of(s) {
            Some(name) => println!("{} ({}): {}", s, name, level),
            None => println!("{}: {}", s, level),
        }
    }

    let satisfiable = match initial {
        Some(s) => levels[s].is_finite(),
        None => levels.iter().any(|l| l.is_finite()),
    };
    if satisfiable {
        0
    } else {
        EXIT_UNSATISFIABLE
    }
}

fn mincap(
    model: &PathBuf,
    initial: &str,
    objective: &str,
    starting_capacity: u32,
    max_starting_load: Option<u32>,
) -> i32 {
    let (mdp, targets) = match load_model(model) {
        Some(loaded) => loaded,
        None => return EXIT_BAD_INPUT,
    };
    let objective = match parse_objective(objective) {
        Some(o) => o,
        None => {
            error!("unknown objective {:?}", objective);
            return EXIT_BAD_INPUT;
        }
    };
    let initial = match resolve_state(&mdp, initial) {
        Some(s) => s,
        None => {
            error!("unknown state {:?}", initial);
            return EXIT_BAD_INPUT;
        }
    };

    match min_capacity(&mdp, initial, targets, objective, starting_capacity, max_starting_load) {
        Ok(capacity) => {
            println!("{}", capacity);
            0
        }
        Err(e @ Error::CapacityTooSmall(_)) => {
            error!("{}", e);
            EXIT_UNSATISFIABLE
        }
        Err(e) => {
            error!("{}", e);
            EXIT_BAD_INPUT
        }
    }
}

fn load_model(path: &PathBuf) -> Option<(ConsMdp, BTreeSet<StateId>)> {
    let document = match std::fs::read_to_string(path) {
        Ok(document) => document,
        Err(e) => {
            error!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    match from_json(&document) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            error!("cannot parse {}: {}", path.display(), e);
            None
        }
    }
}

fn parse_objective(text: &str) -> Option<Objective> {
    match text {
        "min-init-cons" | "mic" => Some(Objective::MinInitCons),
        "safe" => Some(Objective::Safe),
        "pos-reach" => Some(Objective::PosReach),
        "as-reach" => Some(Objective::AsReach),
        "buchi" => Some(Objective::Buchi),
        _ => None,
    }
}

fn resolve_state(mdp: &ConsMdp, text: &str) -> Option<StateId> {
    if let Ok(id) = text.parse::<StateId>() {
        if id < mdp.num_states() {
            return Some(id);
        }
        return None;
    }
    mdp.state_with_name(text)
}
