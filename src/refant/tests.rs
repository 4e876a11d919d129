// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indexmap::IndexMap;
use marlu::LatLngHeight;

use super::*;

fn positions_from_long_offsets(offsets_rad: &[f64]) -> Vec<LatLngHeight> {
    offsets_rad
        .iter()
        .map(|&longitude_rad| LatLngHeight {
            longitude_rad,
            latitude_rad: 0.0,
            height_metres: 0.0,
        })
        .collect()
}

fn names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("ant{i}")).collect()
}

fn score_map(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
    pairs
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect()
}

#[test]
fn test_geometry_centre_antenna_scores_highest() {
    let names = names(5);
    let positions = positions_from_long_offsets(&[-2e-5, -1e-5, 0.0, 1e-5, 2e-5]);
    let scores = geometry_scores(&names, &positions);

    // The antenna at the median location gets the maximum score, N.
    assert_abs_diff_eq!(scores["ant3"], 5.0);
    // Scores fall monotonically with distance from the median location.
    assert!(scores["ant3"] > scores["ant2"]);
    assert!(scores["ant2"] > scores["ant1"]);
    // The outermost antennas score 0.
    assert_abs_diff_eq!(scores["ant1"], 0.0);
    assert_abs_diff_eq!(scores["ant5"], 0.0);
    // Symmetric offsets score equally.
    assert_abs_diff_eq!(scores["ant2"], scores["ant4"]);
}

#[test]
fn test_geometry_outlier_does_not_drag_the_centre() {
    // Four clustered antennas and one far outlier. With a median reference
    // the cluster stays central and the outlier scores worst.
    let names = names(5);
    let positions = positions_from_long_offsets(&[-1e-5, 0.0, 1e-5, 2e-5, 5e-3]);
    let scores = geometry_scores(&names, &positions);

    let outlier = scores["ant5"];
    for name in ["ant1", "ant2", "ant3", "ant4"] {
        assert!(scores[name] > outlier);
    }
}

#[test]
fn test_geometry_degenerate_inputs() {
    assert!(geometry_scores(&[], &[]).is_empty());

    // A single antenna (or co-located antennas) is maximally central.
    let names = names(1);
    let positions = positions_from_long_offsets(&[1e-4]);
    let scores = geometry_scores(&names, &positions);
    assert_abs_diff_eq!(scores["ant1"], 1.0);
}

#[test]
fn test_flagging_scores_scale_with_unflagged_counts() {
    let names = names(3);
    let mut summary = FlagSummary::new();
    summary.insert("BANDPASS", "ant1", 100);
    summary.insert("BANDPASS", "ant2", 50);
    summary.insert("BANDPASS", "ant3", 0);

    let scores = flagging_scores(&summary, "BANDPASS", &names);
    assert_abs_diff_eq!(scores["ant1"], 3.0);
    assert_abs_diff_eq!(scores["ant2"], 1.5);
    assert_abs_diff_eq!(scores["ant3"], 0.0);
    // Never outside [0, N].
    for score in scores.values() {
        assert!((0.0..=3.0).contains(score));
    }
}

#[test]
fn test_flagging_fully_flagged_intent_scores_zero() {
    let names = names(2);
    let summary = FlagSummary::new();
    let scores = flagging_scores(&summary, "BANDPASS", &names);
    assert_abs_diff_eq!(scores["ant1"], 0.0);
    assert_abs_diff_eq!(scores["ant2"], 0.0);
}

#[test]
fn test_flagging_worst_intent_dominates() {
    let names = names(2);
    let mut summary = FlagSummary::new();
    summary.insert("BANDPASS", "ant1", 100);
    summary.insert("BANDPASS", "ant2", 100);
    summary.insert("PHASE", "ant1", 10);
    summary.insert("PHASE", "ant2", 100);

    let scores = flagging_scores(&summary, "BANDPASS,PHASE", &names);
    // ant1 is perfect for BANDPASS but poor for PHASE; the poor intent wins.
    assert_abs_diff_eq!(scores["ant1"], 0.2);
    assert_abs_diff_eq!(scores["ant2"], 2.0);
}

#[test]
fn test_rank_combined_scores() {
    // Geometry [0.9, 0.5, 0.1] and flagging [0.2, 0.8, 0.8] combine to
    // [1.1, 1.3, 0.9].
    let candidates = vec![
        "antenna_1".to_string(),
        "antenna_2".to_string(),
        "antenna_3".to_string(),
    ];
    let geometry = score_map(&[("antenna_1", 0.9), ("antenna_2", 0.5), ("antenna_3", 0.1)]);
    let flagging = score_map(&[("antenna_1", 0.2), ("antenna_2", 0.8), ("antenna_3", 0.8)]);

    let ranked = rank_by_combined_score(candidates, Some(&geometry), Some(&flagging));
    assert_eq!(ranked, ["antenna_2", "antenna_1", "antenna_3"]);
}

#[test]
fn test_rank_dominance() {
    // An antenna strictly better on both scores always ranks first.
    let candidates = vec!["a".to_string(), "b".to_string()];
    let geometry = score_map(&[("a", 1.0), ("b", 2.0)]);
    let flagging = score_map(&[("a", 0.5), ("b", 1.5)]);
    let ranked = rank_by_combined_score(candidates, Some(&geometry), Some(&flagging));
    assert_eq!(ranked, ["b", "a"]);
}

#[test]
fn test_rank_ties_keep_input_order() {
    let candidates = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let scores = score_map(&[("a", 1.0), ("b", 2.0), ("c", 1.0)]);
    let ranked = rank_by_combined_score(candidates, Some(&scores), None);
    assert_eq!(ranked, ["b", "a", "c"]);
}

fn test_context(long_offsets_rad: &[f64]) -> ObsContext {
    let n = long_offsets_rad.len();
    ObsContext {
        antenna_names: vec1::Vec1::try_from_vec(names(n)).unwrap(),
        antenna_positions: vec1::Vec1::try_from_vec(positions_from_long_offsets(long_offsets_rad))
            .unwrap(),
        time_res: hifitime::Duration::from_seconds(8.0),
        spws: vec1::vec1![crate::context::Spw {
            spw_id: 0,
            num_chans: 64,
            baseband: 0,
        }],
    }
}

#[test]
fn test_rank_refant_no_heuristics_is_empty() {
    let ctx = test_context(&[-1e-5, 0.0, 1e-5]);
    let ranked = rank_refant(
        &ctx,
        &FlagSummary::new(),
        "BANDPASS",
        RefantHeuristics {
            geometry: false,
            flagging: false,
        },
        &ExclusionSet::new(),
    );
    assert!(ranked.is_empty());
}

#[test]
fn test_rank_refant_exclusion_happens_before_scoring() {
    let ctx = test_context(&[-1e-5, 0.0, 1e-5]);
    let geometry_only = RefantHeuristics {
        geometry: true,
        flagging: false,
    };

    let ranked = rank_refant(
        &ctx,
        &FlagSummary::new(),
        "BANDPASS",
        geometry_only,
        &ExclusionSet::new(),
    );
    assert_eq!(ranked[0], "ant2");

    // With the centre antenna excluded, the remaining two are re-projected
    // about their own median and tie; dataset order breaks the tie.
    let exclusion: ExclusionSet = ["ant2".to_string()].into_iter().collect();
    let ranked = rank_refant(&ctx, &FlagSummary::new(), "BANDPASS", geometry_only, &exclusion);
    assert_eq!(ranked, ["ant1", "ant3"]);
}

#[test]
fn test_rank_refant_all_excluded_is_empty() {
    let ctx = test_context(&[-1e-5, 0.0, 1e-5]);
    let exclusion: ExclusionSet = ["ant1", "ant2", "ant3"]
        .into_iter()
        .map(String::from)
        .collect();
    let ranked = rank_refant(
        &ctx,
        &FlagSummary::new(),
        "BANDPASS",
        RefantHeuristics::default(),
        &exclusion,
    );
    assert!(ranked.is_empty());
}

#[test]
fn test_rank_refant_drops_fully_flagged_antennas() {
    let ctx = test_context(&[-1e-5, 0.0, 1e-5]);
    let mut summary = FlagSummary::new();
    summary.insert("BANDPASS", "ant1", 100);
    summary.insert("BANDPASS", "ant2", 80);
    // ant3 has no unflagged data at all.

    let ranked = rank_refant(
        &ctx,
        &summary,
        "BANDPASS",
        RefantHeuristics {
            geometry: false,
            flagging: true,
        },
        &ExclusionSet::new(),
    );
    assert_eq!(ranked, ["ant1", "ant2"]);
}

#[test]
fn test_rank_refant_suppresses_drop_that_would_empty_the_set() {
    let ctx = test_context(&[-1e-5, 0.0, 1e-5]);
    // Nothing has unflagged data; every antenna would be dropped.
    let ranked = rank_refant(
        &ctx,
        &FlagSummary::new(),
        "BANDPASS",
        RefantHeuristics::default(),
        &ExclusionSet::new(),
    );
    assert_eq!(ranked.len(), 3);
    // With flagging scores all zero, geometry decides.
    assert_eq!(ranked[0], "ant2");
}

#[test]
fn test_exclusion_set_is_append_only_and_ordered() {
    let mut exclusion = ExclusionSet::new();
    assert!(exclusion.is_empty());
    assert!(exclusion.insert("ant5"));
    assert!(exclusion.insert("ant1"));
    assert!(!exclusion.insert("ant5"));
    assert_eq!(exclusion.len(), 2);
    assert!(exclusion.contains("ant1"));
    assert_eq!(exclusion.iter().collect::<Vec<_>>(), ["ant5", "ant1"]);
    assert_eq!(exclusion.to_string(), "ant5, ant1");
}
