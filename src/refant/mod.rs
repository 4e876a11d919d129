// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to rank candidate reference antennas.
//!
//! An antenna can be scored by its centrality in the array (central antennas
//! have shorter baselines to everything else) and by how much of its data
//! survived flagging. The two scores are deliberately kept on the same scale
//! (0 to the number of antennas) so they can be summed without weights.

mod flagging;
mod geometry;
#[cfg(test)]
mod tests;

pub(crate) use flagging::flagging_scores;
pub(crate) use geometry::geometry_scores;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{debug, trace, warn};
use marlu::LatLngHeight;

use crate::context::{FlagSummary, ObsContext};

/// Which reference-antenna heuristics to apply.
#[derive(Debug, Clone, Copy)]
pub struct RefantHeuristics {
    /// Score antennas by centrality in the array.
    pub geometry: bool,

    /// Score antennas by the fraction of unflagged data per intent.
    pub flagging: bool,
}

impl Default for RefantHeuristics {
    fn default() -> RefantHeuristics {
        RefantHeuristics {
            geometry: true,
            flagging: true,
        }
    }
}

/// Antennas barred from becoming the reference antenna.
///
/// This set only ever grows; the bad-baseband retry loop appends to it, and
/// every subsequent ranking call for the same dataset must see those
/// additions. The caller owns one of these per dataset.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet(IndexSet<String>);

impl ExclusionSet {
    pub fn new() -> ExclusionSet {
        ExclusionSet::default()
    }

    /// Add an antenna. Returns false if it was already present.
    pub fn insert(&mut self, antenna: impl Into<String>) -> bool {
        self.0.insert(antenna.into())
    }

    pub fn contains(&self, antenna: &str) -> bool {
        self.0.contains(antenna)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> ExclusionSet {
        ExclusionSet(iter.into_iter().collect())
    }
}

impl std::fmt::Display for ExclusionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

/// Rank candidate reference antennas, best first.
///
/// Excluded antennas are removed before any scoring happens. With both
/// heuristics enabled an antenna's rank comes from the unweighted sum of its
/// geometry and flagging scores; with one enabled, that score alone; with
/// neither, no antenna can be nominated and the result is empty. Ties keep
/// dataset order.
pub fn rank_refant(
    ctx: &ObsContext,
    summary: &FlagSummary,
    intents: &str,
    heuristics: RefantHeuristics,
    exclusion: &ExclusionSet,
) -> Vec<String> {
    if !heuristics.geometry && !heuristics.flagging {
        debug!("No reference-antenna heuristics are enabled; nominating nothing");
        return vec![];
    }

    // Exclusions are removed before scoring, never after.
    let (names, positions): (Vec<String>, Vec<LatLngHeight>) = ctx
        .antenna_names
        .iter()
        .zip(ctx.antenna_positions.iter())
        .filter(|(name, _)| !exclusion.contains(name))
        .map(|(name, pos)| (name.clone(), *pos))
        .unzip();
    if names.is_empty() {
        warn!("Every antenna is on the exclusion list ({exclusion}); nominating nothing");
        return vec![];
    }

    let geometry = heuristics
        .geometry
        .then(|| geometry_scores(&names, &positions));
    let flagging = heuristics
        .flagging
        .then(|| flagging_scores(summary, intents, &names));

    let mut candidates = names;
    if let Some(flagging) = &flagging {
        drop_zero_scored(&mut candidates, flagging);
    }

    let ranked = rank_by_combined_score(candidates, geometry.as_ref(), flagging.as_ref());
    trace!("Ranked reference antennas: {}", ranked.iter().join(", "));
    ranked
}

/// Remove antennas whose flagging score is exactly zero: they have no
/// unflagged data under at least one intent. The zero is integer-derived (0
/// unflagged samples), so exact floating-point equality is the correct test.
/// If the removal would leave nothing, it is suppressed; the data is
/// unreliable for every candidate, but progress must not halt.
fn drop_zero_scored(candidates: &mut Vec<String>, flagging: &IndexMap<String, f64>) {
    let keep: Vec<String> = candidates
        .iter()
        .filter(|name| flagging[name.as_str()] != 0.0)
        .cloned()
        .collect();
    if keep.is_empty() {
        warn!(
            "All {} candidate reference antennas have completely flagged data; keeping all of them anyway",
            candidates.len()
        );
    } else {
        if keep.len() < candidates.len() {
            debug!(
                "Dropping {} candidate(s) with completely flagged data",
                candidates.len() - keep.len()
            );
        }
        *candidates = keep;
    }
}

/// Order candidates by descending combined score. The sort is stable, so
/// equal scores keep the candidates' input order.
fn rank_by_combined_score(
    candidates: Vec<String>,
    geometry: Option<&IndexMap<String, f64>>,
    flagging: Option<&IndexMap<String, f64>>,
) -> Vec<String> {
    let mut scored: Vec<(String, f64)> = candidates
        .into_iter()
        .map(|name| {
            let g = geometry.map_or(0.0, |scores| scores[name.as_str()]);
            let f = flagging.map_or(0.0, |scores| scores[name.as_str()]);
            (name, g + f)
        })
        .collect();
    scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap());
    scored.into_iter().map(|(name, _)| name).collect()
}
