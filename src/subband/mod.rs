// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to find systematically bad basebands.
//!
//! A misbehaving signal path upstream of the correlator corrupts whole
//! basebands at a time, and it shows up as wild bandpass amplitude or phase
//! structure. The twist: if "bad" antennas are everywhere, the likely culprit
//! is the reference antenna itself, so instead of flagging half the array the
//! loop excludes the top-ranked reference antenna and tries again.


use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::prelude::*;
use num_complex::Complex64;

use crate::constants::{
    DEFAULT_AMP_EXTREMA_RATIO, DEFAULT_BAD_SPW_FRACTION, DEFAULT_PHASE_RANGE_DEG,
};
use crate::context::{FlagSummary, ObsContext};
use crate::refant::{rank_refant, ExclusionSet, RefantHeuristics};
use crate::solver::{BandpassSolutions, Combine, SolveRequest, Solint, Solver, SubbandFlag};

/// Thresholds for the per-antenna, per-spectral-window bandpass quality
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct SubbandQa {
    /// An amplitude spectrum fails when max/min exceeds this.
    pub amp_extrema_ratio: f64,

    /// A phase spectrum fails when its range exceeds this \[degrees\].
    pub phase_range_deg: f64,

    /// A baseband is bad for an antenna when at least this fraction of its
    /// spectral windows fail.
    pub bad_spw_fraction: f64,
}

impl Default for SubbandQa {
    fn default() -> SubbandQa {
        SubbandQa {
            amp_extrema_ratio: DEFAULT_AMP_EXTREMA_RATIO,
            phase_range_deg: DEFAULT_PHASE_RANGE_DEG,
            bad_spw_fraction: DEFAULT_BAD_SPW_FRACTION,
        }
    }
}

/// What to solve and how hard to retry.
#[derive(Debug, Clone)]
pub struct SubbandParams<'a> {
    pub field: &'a str,
    pub intent: &'a str,

    /// The intents used for flagging-score ranking.
    pub ranking_intents: &'a str,

    /// The heuristics used when (re-)ranking reference antennas.
    pub heuristics: RefantHeuristics,

    /// The maximum number of rank-test-exclude cycles.
    pub max_retries: usize,

    /// If more than this fraction of antennas have a bad baseband, the flags
    /// are distrusted and the reference antenna is excluded instead.
    pub bad_antenna_fraction: f64,

    pub qa: SubbandQa,
}

/// The loop's result.
#[derive(Debug)]
pub struct SubbandOutcome {
    /// The reference-antenna ranking in effect when the loop stopped.
    pub ranked: Vec<String>,

    /// Whether the derived flags were applied. Always true on a completed
    /// cycle; false only when no reference antenna could be nominated at all.
    pub applied_flags: bool,

    /// The flag commands that were applied (or would have been).
    pub flags: Vec<SubbandFlag>,

    /// The exclusion set, grown by any reference antennas this loop rejected.
    pub exclusion: ExclusionSet,

    /// The number of cycles run.
    pub cycles: usize,
}

/// Run up to `max_retries` cycles of test-calibrate-and-inspect, excluding
/// the top-ranked reference antenna whenever the derived flags implicate most
/// of the array. On the final cycle the flags are applied no matter what;
/// bounded retries guarantee forward progress.
pub fn retry_with_exclusion<S: Solver>(
    solver: &mut S,
    ctx: &ObsContext,
    summary: &FlagSummary,
    params: SubbandParams,
    mut exclusion: ExclusionSet,
) -> SubbandOutcome {
    let max_retries = params.max_retries.max(1);
    let num_antennas = ctx.antenna_names.len();

    for cycle in 1..=max_retries {
        let ranked = rank_refant(
            ctx,
            summary,
            params.ranking_intents,
            params.heuristics,
            &exclusion,
        );
        if ranked.is_empty() {
            warn!("No usable reference antenna remains; stopping without applying baseband flags");
            return SubbandOutcome {
                ranked,
                applied_flags: false,
                flags: vec![],
                exclusion,
                cycles: cycle,
            };
        }

        debug!(
            "Cycle {cycle}/{max_retries}: test bandpass with reference antenna '{}'",
            ranked[0]
        );
        let outcome = solver.solve(&SolveRequest {
            field: params.field.to_string(),
            intent: params.intent.to_string(),
            spw_ids: ctx.spw_ids(),
            solint: Solint::Inf,
            refant: ranked.clone(),
            combine: Combine::Scan,
            append: false,
        });
        let bandpass = outcome
            .table
            .as_ref()
            .map(|table| solver.inspect_bandpass(table))
            .unwrap_or_default();

        let flags = derive_subband_flags(ctx, &bandpass, &params.qa);
        let num_bad_antennas = flags.iter().map(|flag| flag.antenna.as_str()).unique().count();
        let bad_fraction = num_bad_antennas as f64 / num_antennas as f64;
        info!(
            "Cycle {cycle}: {num_bad_antennas}/{num_antennas} antennas have at least one bad baseband"
        );

        if bad_fraction > params.bad_antenna_fraction {
            if cycle < max_retries {
                let top = ranked[0].clone();
                warn!(
                    "More than {:.0}% of antennas look bad; suspecting reference antenna '{top}' and re-ranking without it",
                    params.bad_antenna_fraction * 100.0
                );
                exclusion.insert(top);
                continue;
            }
            warn!("Retry budget exhausted; applying the derived baseband flags as-is");
        }

        solver.apply_flags(&flags);
        info!("Applied {} baseband flag command(s)", flags.len());
        return SubbandOutcome {
            ranked,
            applied_flags: true,
            flags,
            exclusion,
            cycles: cycle,
        };
    }

    unreachable!("the retry loop always returns within its bounded cycles");
}

/// Test every antenna's bandpass solutions per baseband, flagging the
/// basebands where enough spectral windows fail.
fn derive_subband_flags(
    ctx: &ObsContext,
    bandpass: &BandpassSolutions,
    qa: &SubbandQa,
) -> Vec<SubbandFlag> {
    let mut flags = vec![];
    let basebands = ctx.baseband_spws();

    for (i_ant, antenna) in ctx.antenna_names.iter().enumerate() {
        for (&baseband, spws) in &basebands {
            let mut num_tested = 0;
            let mut num_failed = 0;
            for spw in spws {
                let gains = match bandpass.per_spw.get(&spw.spw_id) {
                    Some(gains) => gains,
                    None => continue,
                };
                num_tested += 1;
                if spw_fails_qa(gains.view(), i_ant, qa) {
                    num_failed += 1;
                }
            }

            if num_tested > 0 && num_failed as f64 / spws.len() as f64 >= qa.bad_spw_fraction {
                debug!(
                    "{antenna}: baseband {baseband} is bad ({num_failed}/{} spws failed)",
                    spws.len()
                );
                flags.push(SubbandFlag {
                    antenna: antenna.clone(),
                    baseband,
                    spw_ids: spws.iter().map(|spw| spw.spw_id).collect(),
                });
            }
        }
    }

    flags
}

/// The ratio-of-extrema test on amplitude and the range test on phase, over
/// every polarisation of one antenna's solutions in one spectral window.
/// Fully flagged (NaN) spectra carry no evidence and pass.
fn spw_fails_qa(gains: ArrayView3<Complex64>, i_ant: usize, qa: &SubbandQa) -> bool {
    if i_ant >= gains.len_of(Axis(1)) {
        return false;
    }

    for pol in 0..gains.len_of(Axis(0)) {
        let spectrum = gains.slice(s![pol, i_ant, ..]);
        let finite: Vec<Complex64> = spectrum
            .iter()
            .filter(|gain| gain.re.is_finite() && gain.im.is_finite())
            .copied()
            .collect();
        if finite.is_empty() {
            continue;
        }

        let (amp_min, amp_max) = finite
            .iter()
            .map(|gain| gain.norm())
            .fold((f64::INFINITY, f64::MIN), |(min, max), amp| {
                (min.min(amp), max.max(amp))
            });
        if amp_min <= 0.0 || amp_max / amp_min > qa.amp_extrema_ratio {
            return true;
        }

        let (phase_min, phase_max) = finite
            .iter()
            .map(|gain| gain.arg().to_degrees())
            .fold((f64::INFINITY, f64::MIN), |(min, max), phase| {
                (min.min(phase), max.max(phase))
            });
        if phase_max - phase_min > qa.phase_range_deg {
            return true;
        }
    }

    false
}
