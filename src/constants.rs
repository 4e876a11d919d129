// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Useful constants.

/// The maximum acceptable median per-antenna flagged-solution fraction for a
/// gain-calibration attempt. Attempts above this fraction escalate to the next
/// solution-interval candidate.
pub const DEFAULT_CRITICAL_FLAGGED_FRACTION: f64 = 0.05;

/// Multiples of the nominal integration time used to build the
/// solution-interval candidate ladder. 1x is issued as the "int" sentinel. The
/// ladder always ends with a whole-scan ("inf") candidate.
pub const SOLINT_LADDER_MULTIPLES: [u64; 3] = [1, 3, 10];

/// A spectral window must retain at least this many independent points across
/// the band after channel pre-averaging. Equivalently, the pre-averaging
/// factor may never exceed num_chans / 32.
pub const MIN_AVERAGED_CHANNELS: usize = 32;

/// A contiguous run of flagged bandpass channels longer than num_chans
/// divided by this is reported as a "large chunk" failure.
pub const LARGE_CHUNK_DIVISOR: usize = 32;

/// The maximum number of rank-exclude-retry cycles when hunting for bad
/// basebands.
pub const DEFAULT_MAX_SUBBAND_RETRIES: usize = 3;

/// If more than this fraction of antennas have at least one bad baseband, the
/// derived flags are distrusted and the top reference antenna is excluded
/// instead.
pub const DEFAULT_BAD_ANTENNA_FRACTION: f64 = 0.5;

/// A bandpass amplitude spectrum fails quality assessment when the ratio of
/// its extrema exceeds this.
pub const DEFAULT_AMP_EXTREMA_RATIO: f64 = 2.0;

/// A bandpass phase spectrum fails quality assessment when its range exceeds
/// this \[degrees\].
pub const DEFAULT_PHASE_RANGE_DEG: f64 = 50.0;

/// A baseband is bad for an antenna when at least this fraction of its
/// spectral windows fail quality assessment.
pub const DEFAULT_BAD_SPW_FRACTION: f64 = 0.5;

/// WGS84 equatorial Earth radius \[metres\]. Used to convert angular antenna
/// offsets into tangent-plane metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
