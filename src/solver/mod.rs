// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interface to the external calibration solver.
//!
//! This crate never reads or writes visibilities or solution tables itself;
//! everything goes through the [`Solver`] trait. A solver attempt that
//! produces nothing useful reports total-failure statistics rather than an
//! error, so escalation logic can treat all outcomes uniformly.


use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::ops::Range;

use hifitime::Duration;
use indexmap::IndexMap;
use ndarray::Array3;
use num_complex::Complex64;
use strum_macros::Display;

use crate::math::median;

/// An opaque handle to a solution table produced by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalTable(pub String);

/// A solution-interval descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solint {
    /// One integration ("int").
    Int,

    /// A fixed time span.
    Time(Duration),

    /// The whole scan ("inf").
    Inf,

    /// Infinite time with N-channel pre-averaging ("inf,Nch"). Used by the
    /// weak-bandpass escalation.
    InfChan(NonZeroUsize),
}

impl Solint {
    /// The combine axis this solution interval implies downstream: solving
    /// over the whole scan (or longer) must be allowed to cross scan
    /// boundaries.
    pub fn combine(self) -> Combine {
        match self {
            Solint::Inf | Solint::InfChan(_) => Combine::Scan,
            Solint::Int | Solint::Time(_) => Combine::None,
        }
    }
}

impl std::fmt::Display for Solint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Solint::Int => write!(f, "int"),
            Solint::Time(d) => write!(f, "{}s", d.to_seconds()),
            Solint::Inf => write!(f, "inf"),
            Solint::InfChan(n) => write!(f, "inf,{n}ch"),
        }
    }
}

impl std::str::FromStr for Solint {
    type Err = crate::unit_parsing::UnitParseError;

    fn from_str(s: &str) -> Result<Solint, Self::Err> {
        crate::unit_parsing::parse_solint(s)
    }
}

/// The combine-axis descriptor attached to a solve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Combine {
    /// Solutions do not cross scan boundaries.
    #[strum(serialize = "")]
    None,

    /// Solutions may integrate across scan boundaries.
    #[strum(serialize = "scan")]
    Scan,
}

/// Everything the solver needs for one calibration attempt.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// The field to calibrate on.
    pub field: String,

    /// The observational intent selecting the data (e.g. "BANDPASS").
    pub intent: String,

    /// The spectral windows to solve.
    pub spw_ids: Vec<usize>,

    /// The solution interval.
    pub solint: Solint,

    /// Candidate reference antennas, best first.
    pub refant: Vec<String>,

    /// The combine-axis descriptor.
    pub combine: Combine,

    /// Append to the attempt's existing solution table instead of starting a
    /// new one. Used when re-solving individual spectral windows.
    pub append: bool,
}

/// The result of one calibration attempt.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The solution table, if any solutions were produced.
    pub table: Option<CalTable>,

    /// Flagged-solution statistics for the attempt. When `table` is `None`
    /// these are total-failure statistics.
    pub stats: FlagStats,
}

/// Flagged-solution statistics reported by the solver after an attempt.
#[derive(Debug, Clone, Default)]
pub struct FlagStats {
    /// The fraction of all solutions that were flagged.
    pub total_fraction: f64,

    /// Per antenna, the median flagged fraction of its solutions.
    pub per_antenna_fraction: IndexMap<String, f64>,

    /// Per-channel flags for each solved spectral window.
    pub per_spw: BTreeMap<usize, SpwFlags>,
}

impl FlagStats {
    /// The statistics reported when a solver call produced nothing usable:
    /// everything flagged.
    pub fn total_failure() -> FlagStats {
        FlagStats {
            total_fraction: 1.0,
            per_antenna_fraction: IndexMap::new(),
            per_spw: BTreeMap::new(),
        }
    }

    /// The median across antennas of the per-antenna flagged fractions. No
    /// per-antenna information degrades to 1.0 (fully flagged).
    pub(crate) fn median_antenna_fraction(&self) -> f64 {
        let fractions: Vec<f64> = self.per_antenna_fraction.values().copied().collect();
        median(&fractions).unwrap_or(1.0)
    }
}

/// Per-polarisation channel flags for one spectral window of a solution
/// table.
#[derive(Debug, Clone)]
pub struct SpwFlags {
    /// The number of fine channels across the band.
    pub num_chans: usize,

    /// One flag vector per polarisation, each `num_chans` long.
    pub flags: Vec<Vec<bool>>,
}

impl SpwFlags {
    /// The contiguous runs of flagged channels in one polarisation's flag
    /// vector.
    pub(crate) fn contiguous_flagged_ranges(&self, pol: usize) -> Vec<Range<usize>> {
        let mut ranges = vec![];
        let mut start = None;
        for (i_chan, &flagged) in self.flags[pol].iter().enumerate() {
            match (flagged, start) {
                (true, None) => start = Some(i_chan),
                (false, Some(s)) => {
                    ranges.push(s..i_chan);
                    start = None;
                }
                _ => (),
            }
        }
        if let Some(s) = start {
            ranges.push(s..self.num_chans);
        }
        ranges
    }

    /// As [`SpwFlags::contiguous_flagged_ranges`], but with ranges touching
    /// either band edge discarded; edge flagging is expected and not evidence
    /// of a failed solve.
    pub(crate) fn interior_flagged_ranges(&self, pol: usize) -> Vec<Range<usize>> {
        self.contiguous_flagged_ranges(pol)
            .into_iter()
            .filter(|r| r.start > 0 && r.end < self.num_chans)
            .collect()
    }

    pub(crate) fn num_pols(&self) -> usize {
        self.flags.len()
    }
}

/// Complex bandpass gains extracted from a solution table.
#[derive(Debug, Clone, Default)]
pub struct BandpassSolutions {
    /// Per spectral window, the gains with dimensions (polarisation, antenna,
    /// channel). Antenna order matches
    /// [`ObsContext::antenna_names`](crate::context::ObsContext). Flagged
    /// solutions are NaN.
    pub per_spw: BTreeMap<usize, Array3<Complex64>>,
}

/// A flag command derived by the bad-baseband quality tests: flag this
/// antenna's data across a whole baseband.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubbandFlag {
    pub antenna: String,
    pub baseband: usize,

    /// The spectral windows making up the baseband.
    pub spw_ids: Vec<usize>,
}

/// The external calibration solver and the table/flag operations around it.
///
/// Implementations block until the underlying solver returns; this crate's
/// loops are strictly sequential because later attempts consume tables
/// produced by earlier ones.
pub trait Solver {
    /// Run one calibration attempt. This never fails: a solver that produced
    /// no valid solutions returns `table: None` and
    /// [`FlagStats::total_failure`] statistics.
    fn solve(&mut self, request: &SolveRequest) -> SolveOutcome;

    /// Extract per-antenna complex bandpass gains from a solution table.
    fn inspect_bandpass(&self, table: &CalTable) -> BandpassSolutions;

    /// Discard a spectral window's (partial) solution rows from a table so a
    /// re-solve can replace them.
    fn discard_spw(&mut self, table: &CalTable, spw_id: usize);

    /// Apply derived flag commands to the dataset.
    fn apply_flags(&mut self, flags: &[SubbandFlag]);
}
