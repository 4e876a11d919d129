// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpers shared across this crate's unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Range;

use hifitime::Duration;
use indexmap::IndexMap;
use marlu::LatLngHeight;
use vec1::Vec1;

use crate::context::{ObsContext, Spw};
use crate::solver::{
    BandpassSolutions, CalTable, FlagStats, SolveOutcome, SolveRequest, Solver, SpwFlags,
    SubbandFlag,
};

/// A [`Solver`] that replays a fixed script of outcomes and records
/// everything asked of it.
pub(crate) struct ScriptedSolver {
    outcomes: VecDeque<SolveOutcome>,
    bandpasses: HashMap<String, BandpassSolutions>,
    pub(crate) requests: Vec<SolveRequest>,
    pub(crate) discarded: Vec<(String, usize)>,
    pub(crate) applied: Vec<Vec<SubbandFlag>>,
}

impl ScriptedSolver {
    pub(crate) fn new(outcomes: impl IntoIterator<Item = SolveOutcome>) -> ScriptedSolver {
        ScriptedSolver {
            outcomes: outcomes.into_iter().collect(),
            bandpasses: HashMap::new(),
            requests: vec![],
            discarded: vec![],
            applied: vec![],
        }
    }

    pub(crate) fn with_bandpass(
        mut self,
        table: &str,
        bandpass: BandpassSolutions,
    ) -> ScriptedSolver {
        self.bandpasses.insert(table.to_string(), bandpass);
        self
    }
}

impl Solver for ScriptedSolver {
    fn solve(&mut self, request: &SolveRequest) -> SolveOutcome {
        self.requests.push(request.clone());
        // Running off the end of the script plays the part of a solver that
        // produced nothing.
        self.outcomes.pop_front().unwrap_or(SolveOutcome {
            table: None,
            stats: FlagStats::total_failure(),
        })
    }

    fn inspect_bandpass(&self, table: &CalTable) -> BandpassSolutions {
        self.bandpasses.get(&table.0).cloned().unwrap_or_default()
    }

    fn discard_spw(&mut self, table: &CalTable, spw_id: usize) {
        self.discarded.push((table.0.clone(), spw_id));
    }

    fn apply_flags(&mut self, flags: &[SubbandFlag]) {
        self.applied.push(flags.to_vec());
    }
}

/// An [`ObsContext`] with antennas strung out along a line of longitude and
/// the given `(spw_id, num_chans, baseband)` spectral windows. The nominal
/// integration time is 8 s.
pub(crate) fn simple_context(names: &[&str], spws: &[(usize, usize, usize)]) -> ObsContext {
    let antenna_names =
        Vec1::try_from_vec(names.iter().map(|name| name.to_string()).collect()).unwrap();
    let antenna_positions = Vec1::try_from_vec(
        (0..names.len())
            .map(|i| LatLngHeight {
                longitude_rad: i as f64 * 1e-5,
                latitude_rad: 0.0,
                height_metres: 0.0,
            })
            .collect(),
    )
    .unwrap();
    let spws = Vec1::try_from_vec(
        spws.iter()
            .map(|&(spw_id, num_chans, baseband)| Spw {
                spw_id,
                num_chans,
                baseband,
            })
            .collect(),
    )
    .unwrap();
    ObsContext {
        antenna_names,
        antenna_positions,
        time_res: Duration::from_seconds(8.0),
        spws,
    }
}

/// A successful solve outcome with the given per-antenna flagged fractions.
pub(crate) fn outcome(table: &str, antenna_fractions: &[(&str, f64)]) -> SolveOutcome {
    let per_antenna_fraction: IndexMap<String, f64> = antenna_fractions
        .iter()
        .map(|(name, fraction)| (name.to_string(), *fraction))
        .collect();
    let total_fraction = if per_antenna_fraction.is_empty() {
        0.0
    } else {
        per_antenna_fraction.values().sum::<f64>() / per_antenna_fraction.len() as f64
    };
    SolveOutcome {
        table: Some(CalTable(table.to_string())),
        stats: FlagStats {
            total_fraction,
            per_antenna_fraction,
            per_spw: BTreeMap::new(),
        },
    }
}

/// A solve outcome carrying single-polarisation channel flags per spectral
/// window: `(spw_id, num_chans, flagged ranges)`.
pub(crate) fn outcome_with_spw_flags(
    table: &str,
    spws: &[(usize, usize, &[Range<usize>])],
) -> SolveOutcome {
    let per_spw: BTreeMap<usize, SpwFlags> = spws
        .iter()
        .map(|&(spw_id, num_chans, ranges)| {
            let mut flags = vec![false; num_chans];
            for range in ranges {
                for chan in range.clone() {
                    flags[chan] = true;
                }
            }
            (
                spw_id,
                SpwFlags {
                    num_chans,
                    flags: vec![flags],
                },
            )
        })
        .collect();
    SolveOutcome {
        table: Some(CalTable(table.to_string())),
        stats: FlagStats {
            total_fraction: 0.0,
            per_antenna_fraction: IndexMap::new(),
            per_spw,
        },
    }
}
