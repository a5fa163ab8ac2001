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

//! Helpers shared by the test modules.

use crate::cmdp::Energy;

/// Build a level vector from integers, with `-1` standing in for `∞`.
pub fn lv(values: &[i64]) -> Vec<Energy> {
    values
        .iter()
        .map(|&v| if v < 0 { Energy::INF } else { Energy::Finite(v as u32) })
        .collect()
}
