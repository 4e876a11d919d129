// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_median_empty() {
    assert_eq!(median(&[]), None);
}

#[test]
fn test_median_odd() {
    assert_abs_diff_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
    assert_abs_diff_eq!(median(&[5.0]).unwrap(), 5.0);
}

#[test]
fn test_median_even() {
    assert_abs_diff_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    // The input is not assumed to be sorted.
    assert_abs_diff_eq!(median(&[10.0, 0.0]).unwrap(), 5.0);
}
