/*
 * Copyright (C) Oscar Shrimpton 2020
 *
 * This program is free software: you can redistribute it and/or modify it
 * under the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Error types

use aldgate_levels::types::ParseError;
use thiserror::Error;

/// A problem with a level as a whole.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Couldn't parse level file")]
    Parse(#[from] ParseError),

    #[error("Level has no world model")]
    NoWorldModel,

    #[error("No level is loaded")]
    NoActiveLevel,

    #[error("Light {0} does not exist")]
    NoSuchLight(usize),
}

/// Displays an error with full backtrace
pub fn full_error_display(err: &anyhow::Error) -> String {
    let cont = err
        .chain()
        .skip(1)
        .map(|cause| format!("    caused by: {}", cause))
        .collect::<Vec<String>>()
        .join("\n");

    format!("Error: {}\n{}", err, cont)
}
