// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse user-supplied solution-interval strings.

mod error;
#[cfg(test)]
mod tests;

pub use error::UnitParseError;

use std::num::NonZeroUsize;

use hifitime::Duration;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::solver::Solint;

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub(crate) enum TimeFormat {
    /// Seconds
    S,

    /// Milliseconds
    Ms,

    NoUnit,
}

/// Parse a string that may have a unit of time attached to it.
pub(crate) fn parse_time(s: &str) -> Result<(f64, TimeFormat), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, TimeFormat::NoUnit));
    };

    // That didn't work; let's search over our supported formats.
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        let suffix = s
            .trim()
            .trim_start_matches(|c| char::is_numeric(c) || c == '.')
            .trim();
        if suffix.to_uppercase() == time_format_str.to_uppercase() {
            let prefix = s.trim().trim_end_matches(char::is_alphabetic).trim();
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotTimeUnitButCantParse {
                        input: s.to_string(),
                        unit: time_format_str,
                    })
                }
            };
            return Ok((number, time_format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "time",
    })
}

/// Parse a solution-interval string: the literal sentinels "int" and "inf",
/// the weak-bandpass form "inf,<N>ch", or a time quantity like "4.5s",
/// "2500ms" or a naked number of seconds.
pub fn parse_solint(s: &str) -> Result<Solint, UnitParseError> {
    let lowered = s.trim().to_lowercase();
    match lowered.as_str() {
        "int" => return Ok(Solint::Int),
        "inf" => return Ok(Solint::Inf),
        _ => (),
    }

    if let Some(rest) = lowered.strip_prefix("inf,") {
        let digits = match rest.trim().strip_suffix("ch") {
            Some(d) => d.trim(),
            None => {
                return Err(UnitParseError::BadChanFactor {
                    input: s.to_string(),
                })
            }
        };
        let factor = digits
            .parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| UnitParseError::BadChanFactor {
                input: s.to_string(),
            })?;
        return Ok(Solint::InfChan(factor));
    }

    let (quantity, time_format) = parse_time(&lowered)?;
    if quantity <= 0.0 {
        return Err(UnitParseError::NonPositive {
            input: s.to_string(),
        });
    }
    let seconds = match time_format {
        TimeFormat::S | TimeFormat::NoUnit => quantity,
        TimeFormat::Ms => quantity / 1e3,
    };
    Ok(Solint::Time(Duration::from_seconds(seconds)))
}
