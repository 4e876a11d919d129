// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to select a robust gain-calibration solution interval.
//!
//! Short intervals track the atmosphere best but fail on weak calibrators;
//! the escalator walks a fixed ladder of ever-longer candidates until the
//! flagged-solution fraction is acceptable, and settles for the best attempt
//! seen if nothing is.


use hifitime::Duration;
use log::{debug, info, warn};

use crate::constants::SOLINT_LADDER_MULTIPLES;
use crate::context::ObsContext;
use crate::solver::{CalTable, Combine, SolveOutcome, SolveRequest, Solint, Solver};

/// What to solve, and when to stop escalating.
#[derive(Debug, Clone)]
pub struct SolintParams<'a> {
    pub field: &'a str,
    pub intent: &'a str,
    pub spw_ids: &'a [usize],

    /// Candidate reference antennas, best first.
    pub refant: &'a [String],

    /// A user-supplied solution interval. If present, the candidate ladder is
    /// bypassed entirely and this is used as-is.
    pub user_solint: Option<Solint>,

    /// The maximum acceptable median per-antenna flagged fraction.
    pub critical_fraction: f64,
}

/// The escalator's decision.
#[derive(Debug)]
pub struct SolintOutcome {
    /// The selected solution interval.
    pub chosen: Solint,

    /// The combine axis the selected interval implies downstream.
    pub combine: Combine,

    /// The solution table of the accepted attempt, if the solver produced
    /// one.
    pub table: Option<CalTable>,

    /// The accepted attempt's median per-antenna flagged fraction.
    pub median_fraction: f64,

    /// True if no candidate met the critical fraction and the best-so-far
    /// attempt was accepted instead.
    pub exhausted: bool,
}

/// The fixed candidate ladder for a nominal integration time: one
/// integration, multiples of it, then the whole scan.
pub fn candidate_ladder(time_res: Duration) -> Vec<Solint> {
    SOLINT_LADDER_MULTIPLES
        .iter()
        .map(|&multiple| {
            if multiple == 1 {
                Solint::Int
            } else {
                Solint::Time(Duration::from_seconds(
                    time_res.to_seconds() * multiple as f64,
                ))
            }
        })
        .chain(std::iter::once(Solint::Inf))
        .collect()
}

/// Select a gain-calibration solution interval by escalating through the
/// candidate ladder until an attempt's median per-antenna flagged fraction is
/// at or below the critical fraction.
///
/// The ladder is finite, so this always terminates; exhausting it accepts the
/// best attempt seen (a warning, not an error). An attempt that is merely as
/// good as the best so far does not replace it, so the shorter interval wins
/// ties.
pub fn select_solint<S: Solver>(
    solver: &mut S,
    ctx: &ObsContext,
    params: SolintParams,
) -> SolintOutcome {
    if let Some(solint) = params.user_solint {
        info!("Using the user-supplied solution interval '{solint}' as-is");
        let outcome = attempt(solver, &params, solint);
        let median_fraction = outcome.stats.median_antenna_fraction();
        return SolintOutcome {
            chosen: solint,
            combine: solint.combine(),
            table: outcome.table,
            median_fraction,
            exhausted: false,
        };
    }

    let candidates = candidate_ladder(ctx.time_res);
    let num_candidates = candidates.len();
    let mut best: Option<(Solint, SolveOutcome, f64)> = None;

    for (i_candidate, solint) in candidates.into_iter().enumerate() {
        debug!(
            "Attempting gain calibration with solint '{solint}' (candidate {}/{num_candidates})",
            i_candidate + 1
        );
        let outcome = attempt(solver, &params, solint);
        let fraction = outcome.stats.median_antenna_fraction();

        if fraction <= params.critical_fraction {
            info!(
                "solint '{solint}': median flagged fraction {fraction:.4} is within {}; accepting",
                params.critical_fraction
            );
            return SolintOutcome {
                chosen: solint,
                combine: solint.combine(),
                table: outcome.table,
                median_fraction: fraction,
                exhausted: false,
            };
        }

        // Equal is not better; the earlier candidate stays.
        let improved = match &best {
            Some((_, _, best_fraction)) => fraction < *best_fraction,
            None => true,
        };
        if improved {
            debug!("solint '{solint}': median flagged fraction {fraction:.4} is the best so far");
            best = Some((solint, outcome, fraction));
        } else {
            debug!("solint '{solint}': median flagged fraction {fraction:.4} did not improve");
        }
    }

    // The ladder is never empty, so an attempt was always recorded.
    let (chosen, outcome, median_fraction) = best.unwrap();
    warn!(
        "No solution interval reached a median flagged fraction of {}; using the best attempt, '{chosen}' ({median_fraction:.4})",
        params.critical_fraction
    );
    SolintOutcome {
        chosen,
        combine: chosen.combine(),
        table: outcome.table,
        median_fraction,
        exhausted: true,
    }
}

fn attempt<S: Solver>(solver: &mut S, params: &SolintParams, solint: Solint) -> SolveOutcome {
    let request = SolveRequest {
        field: params.field.to_string(),
        intent: params.intent.to_string(),
        spw_ids: params.spw_ids.to_vec(),
        solint,
        refant: params.refant.to_vec(),
        combine: solint.combine(),
        append: false,
    };
    solver.solve(&request)
}
