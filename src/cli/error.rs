// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all caltune-related errors.

use thiserror::Error;

use crate::unit_parsing::UnitParseError;

#[derive(Error, Debug)]
pub enum CaltuneError {
    #[error("{0}")]
    Scenario(#[from] ScenarioError),

    #[error("{0}")]
    UnitParse(#[from] UnitParseError),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

/// Errors when reading a scenario file.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Unrecognised scenario file extension on {path}; supported formats: {supported}")]
    UnrecognisedExtension { path: String, supported: String },

    #[error("Couldn't decode toml structure from {path}:\n{err}")]
    Toml { path: String, err: String },

    #[error("Couldn't decode json structure from {path}:\n{err}")]
    Json { path: String, err: String },

    #[error("The scenario in {path} lists no antennas")]
    NoAntennas { path: String },

    #[error("The scenario in {path} lists no spectral windows")]
    NoSpws { path: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
