// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Antimeridian line splitter

use crate::rebase::{dist_to_dateline, dist_to_zero, fold_longitudes};
use geoseam_core::{Geometry, Position};
use smallvec::SmallVec;
use tracing::debug;

/// Longitude in [0, 360)
#[inline]
fn positive(longitude: f64) -> f64 {
    if longitude < 0.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

/// Whether the segment `from -> to` crosses the antimeridian rather than 0°
pub fn crosses_antimeridian(from: Position, to: Position) -> bool {
    let flips = (from.longitude > 0.0 && to.longitude < 0.0)
        || (from.longitude < 0.0 && to.longitude > 0.0);
    flips
        && dist_to_dateline(from.longitude) + dist_to_dateline(to.longitude)
            < dist_to_zero(from.longitude) + dist_to_zero(to.longitude)
}

/// Latitude where `from -> to` meets the antimeridian, interpolated linearly
/// in longitude
pub fn crossing_latitude(from: Position, to: Position) -> f64 {
    let lon_from = positive(from.longitude);
    let lon_to = positive(to.longitude);
    if lon_to == lon_from {
        return from.latitude;
    }
    from.latitude + (to.latitude - from.latitude) * (180.0 - lon_from) / (lon_to - lon_from)
}

fn push_distinct(line: &mut Vec<Position>, p: Position) {
    if line.last() != Some(&p) {
        line.push(p);
    }
}

/// Cut a line wherever it crosses the antimeridian.
///
/// Returns the original line, untouched, when it never crosses; otherwise a
/// multi-line whose parts end and start on ±180 at the interpolated latitude.
/// A line that only reaches the seam from one side stays a single line, with
/// its seam vertex written on that side.
pub fn split_line(line: &[Position]) -> Geometry {
    if line.len() < 2 {
        return Geometry::LineString(line.to_vec());
    }

    let folded = fold_longitudes(line);
    let mut parts: SmallVec<[Vec<Position>; 2]> = SmallVec::new();
    let mut current = vec![folded[0]];

    for pair in folded.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if crosses_antimeridian(from, to) {
            let latitude = crossing_latitude(from, to);
            let seam = if from.longitude > 0.0 { 180.0 } else { -180.0 };
            push_distinct(&mut current, Position::new(seam, latitude));
            parts.push(std::mem::replace(
                &mut current,
                vec![Position::new(-seam, latitude)],
            ));
        }
        push_distinct(&mut current, to);
    }
    parts.push(current);

    if parts.len() == 1 {
        return Geometry::LineString(line.to_vec());
    }
    // A vertex sitting on ±180 leaves a single-position stub on its side of the seam
    parts.retain(|part| part.len() >= 2);
    match parts.len() {
        0 => Geometry::LineString(line.to_vec()),
        1 => Geometry::LineString(parts.swap_remove(0)),
        count => {
            debug!("Split line of {} points into {} parts", line.len(), count);
            Geometry::MultiLineString(parts.into_vec())
        }
    }
}
