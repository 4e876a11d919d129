// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Score antennas by how much of their data survived flagging.

use indexmap::IndexMap;
use log::debug;

use crate::context::FlagSummary;

/// Score each antenna by its unflagged sample count, per intent, then reduce
/// to one score per antenna by taking the minimum across intents: an antenna
/// that is good for one intent but bad for another must not be preferred.
///
/// Per intent, scores run from 0 to N (the number of antennas), with N going
/// to the antenna(s) with the most unflagged data. If every antenna is fully
/// flagged for an intent, every antenna scores 0 for it.
pub(crate) fn flagging_scores(
    summary: &FlagSummary,
    intents: &str,
    names: &[String],
) -> IndexMap<String, f64> {
    let num_ants = names.len() as f64;
    let mut scores: IndexMap<String, f64> = IndexMap::with_capacity(names.len());

    let mut num_intents = 0;
    for intent in intents.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        num_intents += 1;
        let counts: Vec<u64> = names
            .iter()
            .map(|name| summary.unflagged_count(intent, name))
            .collect();
        let max_count = counts.iter().copied().max().unwrap_or(0);
        debug!("Intent {intent}: best unflagged sample count is {max_count}");

        for (name, count) in names.iter().zip(counts) {
            let score = if max_count == 0 {
                0.0
            } else {
                num_ants * count as f64 / max_count as f64
            };
            scores
                .entry(name.clone())
                .and_modify(|s| *s = s.min(score))
                .or_insert(score);
        }
    }

    if num_intents == 0 {
        debug!("No intents were supplied; all flagging scores are 0");
        for name in names {
            scores.insert(name.clone(), 0.0);
        }
    }

    scores
}
