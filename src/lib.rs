// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Adaptive calibration-parameter selection for radio-interferometer pipelines.

This crate chooses *how* an external calibration solver should be driven: the
reference antenna, the gain-calibration solution interval, and bandpass
channel pre-averaging factors. It reacts to the flagged-solution statistics
each attempt produces, escalating through bounded candidate ladders until the
result is acceptable, and it never fails outright; every loop yields some
usable decision.
 */

pub mod bandpass;
mod cli;
pub mod constants;
pub mod context;
pub(crate) mod math;
pub mod refant;
pub mod solint;
pub mod solver;
pub mod subband;
pub mod unit_parsing;

#[cfg(test)]
mod tests;

// Re-exports.
pub use cli::{Caltune, CaltuneError, ScenarioError};
