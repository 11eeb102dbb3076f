// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Longitude rebasing
//!
//! Chooses, for each pair of adjacent vertices, between the path through the
//! 0° meridian and the path through the antimeridian, and rewrites
//! longitudes into an unwrapped numeric range so that the numeric difference
//! follows the shorter path. Distances here are plain longitude magnitudes,
//! good enough to pick a side of the seam but not for measuring.

use geoseam_core::Position;
use tracing::trace;

/// Stand-in for 0° after an unwrapped longitude ≥ 180, so an equirectangular
/// renderer reads the segment as passing through 270° and not 90°
pub const NUDGED_FULL_TURN: f64 = 359.999999999999;

/// Longitude distance to the antimeridian
pub fn dist_to_dateline(longitude: f64) -> f64 {
    if longitude > 0.0 {
        if longitude < 180.0 {
            180.0 - longitude
        } else {
            longitude - 180.0
        }
    } else {
        -(-180.0 - longitude)
    }
}

/// Longitude distance to the 0° meridian
pub fn dist_to_zero(longitude: f64) -> f64 {
    if longitude > 0.0 {
        if longitude < 180.0 {
            longitude
        } else {
            360.0 - longitude
        }
    } else {
        -longitude
    }
}

#[inline]
fn through_zero(previous: f64, next: f64) -> f64 {
    dist_to_zero(previous) + dist_to_zero(next)
}

#[inline]
fn through_dateline(previous: f64, next: f64) -> f64 {
    dist_to_dateline(previous) + dist_to_dateline(next)
}

/// Rebase `next` against `previous`.
///
/// Returns `true` when `previous` was rewritten instead (+360); the caller
/// must then shift every vertex emitted before `previous` the same way.
pub fn normalize_next_coordinate(previous: &mut Position, next: &mut Position) -> bool {
    let lon_p = previous.longitude;
    let lon_n = next.longitude;
    let mut update_previous = false;

    if (0.0..180.0).contains(&lon_p) {
        if (-180.0..0.0).contains(&lon_n) {
            if through_zero(lon_p, lon_n) > through_dateline(lon_p, lon_n) {
                next.longitude += 360.0;
            }
        } else if lon_n > 180.0
            && lon_n < 360.0
            && through_zero(lon_p, lon_n) < through_dateline(lon_p, lon_n)
        {
            next.longitude -= 360.0;
        }
    } else if lon_p >= 180.0 {
        if (-180.0..0.0).contains(&lon_n) {
            next.longitude += 360.0;
        } else if lon_n == 0.0 {
            next.longitude = NUDGED_FULL_TURN;
        }
    } else if lon_n > 180.0 {
        // next was unwrapped by an earlier step; follow it
        previous.longitude += 360.0;
        update_previous = true;
    } else if (0.0..180.0).contains(&lon_n)
        && through_dateline(lon_p, lon_n) < through_zero(lon_p, lon_n)
    {
        previous.longitude += 360.0;
        update_previous = true;
    }

    trace!(
        "IN ({}, {}) -> OUT ({}, {})",
        lon_p,
        lon_n,
        previous.longitude,
        next.longitude
    );
    update_previous
}

/// Unwrap the longitudes of a closed ring so consecutive vertices never jump
/// across the antimeridian. The ring stays closed.
pub fn unwrap_longitudes(ring: &[Position]) -> Vec<Position> {
    let mut out = ring.to_vec();
    for i in 1..out.len() {
        let (head, tail) = out.split_at_mut(i);
        let (emitted, previous) = head.split_at_mut(i - 1);
        if normalize_next_coordinate(&mut previous[0], &mut tail[0]) {
            for p in emitted.iter_mut() {
                p.longitude += 360.0;
            }
        }
    }
    if let (Some(first), Some(last)) = (out.first().copied(), out.last_mut()) {
        *last = first;
    }
    out
}

/// Fold longitudes above 180 back into [-180, 180]
pub fn fold_longitudes(points: &[Position]) -> Vec<Position> {
    points
        .iter()
        .map(|p| {
            if p.longitude > 180.0 {
                p.with_longitude(p.longitude - 360.0)
            } else {
                *p
            }
        })
        .collect()
}
