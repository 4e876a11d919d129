// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::num::NonZeroUsize;

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_sentinels() {
    assert_eq!(parse_solint("int").unwrap(), Solint::Int);
    assert_eq!(parse_solint(" INT ").unwrap(), Solint::Int);
    assert_eq!(parse_solint("inf").unwrap(), Solint::Inf);
    assert_eq!(parse_solint("Inf").unwrap(), Solint::Inf);
}

#[test]
fn test_inf_chan() {
    assert_eq!(
        parse_solint("inf,8ch").unwrap(),
        Solint::InfChan(NonZeroUsize::new(8).unwrap())
    );
    assert_eq!(
        parse_solint("inf, 2 ch").unwrap(),
        Solint::InfChan(NonZeroUsize::new(2).unwrap())
    );

    assert!(parse_solint("inf,0ch").is_err());
    assert!(parse_solint("inf,8").is_err());
    assert!(parse_solint("inf,ch").is_err());
}

#[test]
fn test_time_quantities() {
    match parse_solint("4.5s").unwrap() {
        Solint::Time(d) => assert_abs_diff_eq!(d.to_seconds(), 4.5),
        other => panic!("expected a time solint, got {other}"),
    }
    match parse_solint("2500ms").unwrap() {
        Solint::Time(d) => assert_abs_diff_eq!(d.to_seconds(), 2.5),
        other => panic!("expected a time solint, got {other}"),
    }
    // A naked number is seconds.
    match parse_solint("8").unwrap() {
        Solint::Time(d) => assert_abs_diff_eq!(d.to_seconds(), 8.0),
        other => panic!("expected a time solint, got {other}"),
    }
}

#[test]
fn test_rejects() {
    assert!(parse_solint("0").is_err());
    assert!(parse_solint("-3s").is_err());
    assert!(parse_solint("forever").is_err());
    assert!(parse_solint("3 fortnights").is_err());
}
