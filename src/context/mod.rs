// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Observation metadata needed by the parameter-selection heuristics.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use hifitime::Duration;
use indexmap::IndexMap;
use marlu::LatLngHeight;
use vec1::Vec1;

/// A spectral window: a contiguous band of fine-frequency channels.
#[derive(Debug, Clone)]
pub struct Spw {
    /// The spectral window's ID in the dataset.
    pub spw_id: usize,

    /// The number of fine channels across the band.
    pub num_chans: usize,

    /// The baseband (sub-band) this spectral window belongs to. Spectral
    /// windows sharing a baseband pass through a common front-end filter and
    /// tend to fail calibration as a unit.
    pub baseband: usize,
}

/// Static observation metadata, created once per dataset.
///
/// This is deliberately small; the heuristics in this crate never read
/// visibilities, only metadata and the statistics reported back by the
/// [`Solver`](crate::solver::Solver).
#[derive(Debug, Clone)]
pub struct ObsContext {
    /// The names of all antennas in the array, flagged or not.
    pub antenna_names: Vec1<String>,

    /// The geodetic positions of all antennas, in the same order as
    /// [`ObsContext::antenna_names`].
    pub antenna_positions: Vec1<LatLngHeight>,

    /// The nominal integration time of the supplied data. This is not
    /// necessarily the native correlator resolution; the data may have been
    /// averaged on import.
    pub time_res: Duration,

    /// The spectral windows of the dataset.
    pub spws: Vec1<Spw>,
}

impl ObsContext {
    /// All spectral window IDs, in dataset order.
    pub fn spw_ids(&self) -> Vec<usize> {
        self.spws.iter().map(|spw| spw.spw_id).collect()
    }

    /// The spectral windows of each baseband, keyed by baseband number.
    pub(crate) fn baseband_spws(&self) -> BTreeMap<usize, Vec<&Spw>> {
        let mut basebands: BTreeMap<usize, Vec<&Spw>> = BTreeMap::new();
        for spw in &self.spws {
            basebands.entry(spw.baseband).or_default().push(spw);
        }
        basebands
    }

    pub(crate) fn spw(&self, spw_id: usize) -> Option<&Spw> {
        self.spws.iter().find(|spw| spw.spw_id == spw_id)
    }
}

/// Per-intent, per-antenna counts of unflagged visibility samples, as
/// produced by an external flagging summariser.
#[derive(Debug, Clone, Default)]
pub struct FlagSummary {
    /// Intent (e.g. "BANDPASS") -> antenna name -> unflagged sample count.
    per_intent: IndexMap<String, IndexMap<String, u64>>,
}

impl FlagSummary {
    pub fn new() -> FlagSummary {
        FlagSummary::default()
    }

    /// Record the unflagged sample count for an antenna under an intent.
    pub fn insert(&mut self, intent: &str, antenna: &str, unflagged: u64) {
        self.per_intent
            .entry(intent.to_string())
            .or_default()
            .insert(antenna.to_string(), unflagged);
    }

    /// The unflagged sample count for an antenna under an intent. Antennas
    /// and intents with no recorded counts report 0; as far as scoring is
    /// concerned, no data and fully-flagged data are the same thing.
    pub fn unflagged_count(&self, intent: &str, antenna: &str) -> u64 {
        self.per_intent
            .get(intent)
            .and_then(|counts| counts.get(antenna))
            .copied()
            .unwrap_or(0)
    }
}
