// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print the solution-interval candidate ladder the escalator would walk.


use clap::Args;

use super::{CaltuneError, InfoPrinter};
use crate::solint::candidate_ladder;
use crate::solver::Solint;
use crate::unit_parsing::{parse_solint, UnitParseError};

#[derive(Debug, Args)]
pub(super) struct PlanSolintArgs {
    /// The nominal integration time of the data, e.g. "8s" or "2000ms".
    #[clap(short = 't', long)]
    int_time: String,

    /// A user-supplied solution interval ("int", "inf" or e.g. "16s"). If
    /// given, the ladder is bypassed and this is used as-is.
    #[clap(short, long)]
    solint: Option<String>,
}

impl PlanSolintArgs {
    pub(super) fn run(self) -> Result<(), CaltuneError> {
        if let Some(solint) = self.solint {
            let solint = parse_solint(&solint)?;
            let mut printer = InfoPrinter::new("User-supplied solution interval".into());
            printer.push_line(
                format!("'{solint}' used as-is (combine: '{}')", solint.combine()).into(),
            );
            printer.display();
            return Ok(());
        }

        let time_res = match parse_solint(&self.int_time)? {
            Solint::Time(duration) => duration,
            _ => {
                return Err(UnitParseError::Unknown {
                    input: self.int_time,
                    unit_type: "integration time",
                }
                .into())
            }
        };

        let mut printer = InfoPrinter::new(
            format!(
                "Solution-interval ladder for {}s integrations",
                time_res.to_seconds()
            )
            .into(),
        );
        for (i_candidate, solint) in candidate_ladder(time_res).iter().enumerate() {
            printer.push_line(
                format!(
                    "{}: '{solint}' (combine: '{}')",
                    i_candidate + 1,
                    solint.combine()
                )
                .into(),
            );
        }
        printer.display();
        Ok(())
    }
}
