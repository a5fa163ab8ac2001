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

//! Module containing all error types

use crate::cmdp::CmdpError;
use crate::io::IoError;
use crate::solvers::Objective;
use crate::strategy::StrategyError;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error propagated from the CMDP store
    #[error("Model error: {0}")]
    Cmdp(#[from] CmdpError),
    /// Error propagated from a selector or strategy
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
    /// Error propagated from import or export
    #[error("IO error: {0}")]
    Io(#[from] IoError),
    /// The capacity search exhausted its range without success.
    #[error("No capacity up to {0} is enough")]
    CapacityTooSmall(u32),
    /// The requested operation does not support this objective.
    #[error("The {0} objective is not supported here")]
    UnsupportedObjective(Objective),
}
