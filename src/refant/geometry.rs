// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Score antennas by centrality in the array.

use indexmap::IndexMap;
use marlu::LatLngHeight;

use crate::constants::EARTH_RADIUS_M;
use crate::math::median;

/// Score each antenna by its distance from the array's median location;
/// central antennas score highest. Scores run from 0 (the outermost antenna)
/// to N, the number of antennas.
///
/// The medians (rather than means) of the longitudes, latitudes and
/// tangent-plane offsets are used throughout so that a single outlier antenna
/// on a long arm cannot drag the reference point towards itself.
pub(crate) fn geometry_scores(
    names: &[String],
    positions: &[LatLngHeight],
) -> IndexMap<String, f64> {
    assert_eq!(names.len(), positions.len());
    let num_ants = names.len();
    if num_ants == 0 {
        return IndexMap::new();
    }

    let longitudes: Vec<f64> = positions.iter().map(|p| p.longitude_rad).collect();
    let latitudes: Vec<f64> = positions.iter().map(|p| p.latitude_rad).collect();
    let centre_long = median(&longitudes).unwrap();
    let centre_lat = median(&latitudes).unwrap();

    // Project onto the local tangent plane about the median longitude and
    // latitude.
    let (xs, ys): (Vec<f64>, Vec<f64>) = positions
        .iter()
        .map(|p| {
            let radius = EARTH_RADIUS_M + p.height_metres;
            let x = radius * p.latitude_rad.cos() * (p.longitude_rad - centre_long);
            let y = radius * (p.latitude_rad - centre_lat);
            (x, y)
        })
        .unzip();
    let x_ref = median(&xs).unwrap();
    let y_ref = median(&ys).unwrap();

    let distances: Vec<f64> = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - x_ref).hypot(y - y_ref))
        .collect();
    let max_distance = distances.iter().fold(0.0_f64, |acc, &d| acc.max(d));

    names
        .iter()
        .zip(distances)
        .map(|(name, distance)| {
            // All antennas co-located: everything is maximally central.
            let score = if max_distance > 0.0 {
                (1.0 - distance / max_distance) * num_ants as f64
            } else {
                num_ants as f64
            };
            (name.clone(), score)
        })
        .collect()
}
