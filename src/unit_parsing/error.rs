// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnitParseError {
    #[error("Got a unit of {unit} in {input}, but couldn't parse the quantity")]
    GotTimeUnitButCantParse { input: String, unit: &'static str },

    #[error("Couldn't parse {input} into a {unit_type} quantity")]
    Unknown {
        input: String,
        unit_type: &'static str,
    },

    #[error("The solution interval {input} is not a positive quantity")]
    NonPositive { input: String },

    #[error("The channel factor in {input} must be a positive integer followed by 'ch'")]
    BadChanFactor { input: String },
}
