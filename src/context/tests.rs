// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;
use crate::tests::simple_context;

#[test]
fn test_baseband_spws() {
    let ctx = simple_context(&["ant1", "ant2"], &[(0, 64, 0), (1, 64, 0), (2, 64, 1)]);
    let basebands = ctx.baseband_spws();
    assert_eq!(basebands.len(), 2);
    assert_eq!(
        basebands[&0].iter().map(|spw| spw.spw_id).collect::<Vec<_>>(),
        [0, 1]
    );
    assert_eq!(
        basebands[&1].iter().map(|spw| spw.spw_id).collect::<Vec<_>>(),
        [2]
    );
}

#[test]
fn test_flag_summary_missing_entries_are_zero() {
    let mut summary = FlagSummary::new();
    summary.insert("BANDPASS", "ant1", 100);

    assert_eq!(summary.unflagged_count("BANDPASS", "ant1"), 100);
    assert_eq!(summary.unflagged_count("BANDPASS", "ant2"), 0);
    assert_eq!(summary.unflagged_count("PHASE", "ant1"), 0);
}
