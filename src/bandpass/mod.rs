// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to select channel pre-averaging factors for bandpass calibration
//! ("weak bandpass" mode).
//!
//! A weak bandpass calibrator leaves gaps of failed solutions across the
//! band. Pre-averaging adjacent channels before solving trades spectral
//! resolution for signal-to-noise, so each failing spectral window has its
//! factor doubled until its solutions are contiguous or so few averaged
//! points would remain that the gappy solution is the lesser evil.


use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use log::{debug, info, warn};
use strum_macros::Display;

use crate::constants::{LARGE_CHUNK_DIVISOR, MIN_AVERAGED_CHANNELS};
use crate::context::ObsContext;
use crate::solver::{CalTable, Combine, SolveRequest, Solint, Solver, SpwFlags};

/// How downstream application should interpolate over the bandpass table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InterpMode {
    /// The solver's default interpolation.
    #[strum(serialize = "")]
    Default,

    /// Nearest-neighbour interpolation. Required once any escalation has
    /// happened: solutions may have channel gaps, and interpolating across
    /// them linearly would invent structure.
    #[strum(serialize = "nearest")]
    Nearest,
}

/// What to solve.
#[derive(Debug, Clone)]
pub struct ChanAverageParams<'a> {
    pub field: &'a str,
    pub intent: &'a str,

    /// Candidate reference antennas, best first.
    pub refant: &'a [String],
}

/// The escalator's decision.
#[derive(Debug)]
pub struct ChanAverageOutcome {
    /// The selected pre-averaging factor for every spectral window; 1 means
    /// full resolution.
    pub factors: BTreeMap<usize, usize>,

    /// The interpolation mode downstream application must use.
    pub interp: InterpMode,

    /// The final solution table, if the solver produced one.
    pub table: Option<CalTable>,

    /// Spectral windows whose solutions still have gaps: escalation hit the
    /// minimum-averaged-points floor before the gaps closed.
    pub gappy_spws: Vec<usize>,
}

/// What detection found wrong with a spectral window's solutions.
struct Detection {
    large_chunk: bool,
}

/// Select a channel pre-averaging factor per spectral window by escalating
/// every failing window until its solutions are contiguous or its factor
/// floor is reached.
///
/// Spectral windows are processed in ascending ID order, one at a time;
/// later attempts append to the solution table earlier attempts produced.
pub fn select_chan_average<S: Solver>(
    solver: &mut S,
    ctx: &ObsContext,
    params: ChanAverageParams,
) -> ChanAverageOutcome {
    let spw_ids = ctx.spw_ids();

    // Full spectral resolution across all spectral windows first.
    debug!("Attempting a full-resolution bandpass solve");
    let outcome = solver.solve(&SolveRequest {
        field: params.field.to_string(),
        intent: params.intent.to_string(),
        spw_ids: spw_ids.clone(),
        solint: Solint::Inf,
        refant: params.refant.to_vec(),
        combine: Combine::Scan,
        append: false,
    });
    let mut table = outcome.table;

    let mut factors: BTreeMap<usize, usize> = spw_ids.iter().map(|&spw_id| (spw_id, 1)).collect();
    let mut gappy_spws = vec![];

    // Failing spectral windows, and the factor each should try next.
    let mut retry: BTreeMap<usize, usize> = BTreeMap::new();
    for spw in &ctx.spws {
        if let Some(detection) = detect_failures(outcome.stats.per_spw.get(&spw.spw_id)) {
            if detection.large_chunk {
                warn!(
                    "spw {}: a contiguous failure spans more than 1/{LARGE_CHUNK_DIVISOR} of the band",
                    spw.spw_id
                );
            }
            retry.insert(spw.spw_id, 2);
        }
    }

    let escalated = !retry.is_empty();
    if escalated {
        info!(
            "{} spectral window(s) failed the full-resolution bandpass; escalating channel pre-averaging",
            retry.len()
        );
    }

    loop {
        // Lowest remaining spw first; the iteration order is fixed.
        let (spw_id, factor) = match retry.iter().next() {
            Some((&spw_id, &factor)) => (spw_id, factor),
            None => break,
        };
        let spw = ctx.spw(spw_id).expect("retry set only holds known spws");
        let factor_floor = spw.num_chans / MIN_AVERAGED_CHANNELS;
        if factor > factor_floor {
            warn!(
                "spw {spw_id}: pre-averaging by {factor} would leave fewer than {MIN_AVERAGED_CHANNELS} points across the band; accepting the current solution with gaps",
            );
            gappy_spws.push(spw_id);
            retry.remove(&spw_id);
            continue;
        }

        // Throw away this spw's partial solutions and re-solve coarser.
        if let Some(table) = &table {
            solver.discard_spw(table, spw_id);
        }
        debug!("spw {spw_id}: re-solving the bandpass with solint 'inf,{factor}ch'");
        let outcome = solver.solve(&SolveRequest {
            field: params.field.to_string(),
            intent: params.intent.to_string(),
            spw_ids: vec![spw_id],
            solint: Solint::InfChan(NonZeroUsize::new(factor).unwrap()),
            refant: params.refant.to_vec(),
            combine: Combine::Scan,
            append: true,
        });
        if outcome.table.is_some() {
            table = outcome.table;
        }
        factors.insert(spw_id, factor);

        match detect_failures(outcome.stats.per_spw.get(&spw_id)) {
            None => {
                debug!("spw {spw_id}: no contiguous failures at factor {factor}");
                retry.remove(&spw_id);
            }
            Some(_) => {
                retry.insert(spw_id, factor * 2);
            }
        }
    }

    let interp = if escalated {
        InterpMode::Nearest
    } else {
        InterpMode::Default
    };
    if escalated {
        info!(
            "Weak-bandpass escalation finished; downstream interpolation must be '{}'",
            InterpMode::Nearest
        );
    }
    ChanAverageOutcome {
        factors,
        interp,
        table,
        gappy_spws,
    }
}

/// Scan a spectral window's per-polarisation flags for contiguous interior
/// failures. `None` means the window is healthy. Absent statistics mean the
/// solver produced nothing for the window, which is not healthy.
fn detect_failures(flags: Option<&SpwFlags>) -> Option<Detection> {
    let flags = match flags {
        Some(flags) => flags,
        None => return Some(Detection { large_chunk: false }),
    };

    let large_threshold = flags.num_chans / LARGE_CHUNK_DIVISOR;
    let mut any = false;
    let mut large_chunk = false;
    for pol in 0..flags.num_pols() {
        for range in flags.interior_flagged_ranges(pol) {
            any = true;
            if range.len() > large_threshold {
                large_chunk = true;
            }
        }
    }
    any.then_some(Detection { large_chunk })
}
