// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar ring repair and antimeridian splitting
//!
//! Rings are treated as planar polygons in (longitude, latitude) space.
//! Self-intersections are resolved with the i_overlay boolean engine, and
//! rings that leave [-180, 180] are clipped against 360°-wide windows and
//! shifted back. Holes produced by either operation are discarded.

use crate::error::{Error, Result};
use geoseam_core::{Position, Ring};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use tracing::debug;

/// Output rings smaller than this (in square degrees) are dropped
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Longitudes this close to ±180 (or to 0 after a window split) are snapped
/// onto that meridian
const SEAM_SNAP: f64 = 1e-6;

/// Append the first position if the ring is open
pub fn close_ring(ring: &[Position]) -> Ring {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (closed.first().copied(), closed.last()) {
        if first != *last {
            closed.push(first);
        }
    }
    closed
}

/// Drop consecutive duplicate positions
pub fn dedup_consecutive(ring: &[Position]) -> Ring {
    let mut out: Ring = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    out
}

/// Number of distinct vertices of a closed ring
pub fn distinct_vertex_count(ring: &[Position]) -> usize {
    let open = open_ring(ring);
    let mut seen: Vec<Position> = Vec::with_capacity(open.len());
    for p in open {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len()
}

/// Compute the signed area of a ring (open or closed)
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(ring: &[Position]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = ring.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i].longitude * ring[j].latitude;
        area -= ring[j].longitude * ring[i].latitude;
    }

    area * 0.5
}

/// Ensure ring has counter-clockwise winding (positive area)
pub fn ensure_ccw(ring: &[Position]) -> Ring {
    if signed_area(ring) < 0.0 {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    }
}

/// Whether a closed ring has no self-intersections, touching included
pub fn is_simple_ring(ring: &[Position]) -> bool {
    let ring = dedup_consecutive(&close_ring(ring));
    if ring.len() < 4 {
        return false;
    }
    let n = ring.len() - 1;

    for i in 0..n {
        let (a, b) = (ring[i], ring[i + 1]);

        // Spike: the next edge folds back onto this one
        let c = ring[(i + 2) % n];
        if orientation(a, b, c) == 0.0 && dot(a, b, c) > 0.0 {
            return false;
        }

        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_intersect(a, b, ring[j], ring[j + 1]) {
                return false;
            }
        }
    }
    true
}

/// Split a ring into simple exterior rings.
///
/// A simple ring comes back unchanged. A self-intersecting one goes through
/// an even-odd overlay of the ring with itself; holes of the result are dropped.
pub fn repair_ring(ring: &[Position]) -> Result<Vec<Ring>> {
    let closed = close_ring(ring);
    if distinct_vertex_count(&closed) < 3 {
        return Err(Error::RingRepair(format!(
            "ring needs at least 3 distinct vertices, got {}",
            distinct_vertex_count(&closed)
        )));
    }

    if is_simple_ring(&closed) {
        return Ok(vec![closed]);
    }

    let subject = vec![ring_to_path(&closed)];
    let clip: Vec<Vec<[f64; 2]>> = Vec::new();
    let shapes = subject.overlay(&clip, OverlayRule::Subject, FillRule::EvenOdd);
    let rings = shapes_to_rings(&shapes, None);

    if rings.is_empty() {
        return Err(Error::RingRepair(
            "self-intersecting ring has no remaining area".to_string(),
        ));
    }
    debug!("Repaired self-intersecting ring into {} rings", rings.len());
    Ok(rings)
}

/// Cut an unwrapped ring into pieces that each fit in [-180, 180].
///
/// Rings already inside that range are returned unchanged.
pub fn split_at_antimeridian(ring: &[Position]) -> Vec<Ring> {
    let Some((min_lon, max_lon, min_lat, max_lat)) = bounds(ring) else {
        return Vec::new();
    };
    if min_lon >= -180.0 && max_lon <= 180.0 {
        return vec![ring.to_vec()];
    }

    let subject = vec![ring_to_path(&close_ring(ring))];
    let first_window = ((min_lon - 180.0) / 360.0).floor() as i64 + 1;
    let last_window = ((max_lon + 180.0) / 360.0).ceil() as i64 - 1;

    let mut pieces = Vec::new();
    for k in first_window..=last_window {
        let offset = 360.0 * k as f64;
        let window = vec![vec![
            [offset - 180.0, min_lat - 1.0],
            [offset + 180.0, min_lat - 1.0],
            [offset + 180.0, max_lat + 1.0],
            [offset - 180.0, max_lat + 1.0],
        ]];
        let shapes = subject.overlay(&window, OverlayRule::Intersect, FillRule::EvenOdd);
        pieces.extend(shapes_to_rings(&shapes, Some(offset)));
    }

    debug!(
        "Split ring spanning [{}, {}] into {} pieces",
        min_lon,
        max_lon,
        pieces.len()
    );
    pieces
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn open_ring(ring: &[Position]) -> &[Position] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

fn bounds(ring: &[Position]) -> Option<(f64, f64, f64, f64)> {
    let first = ring.first()?;
    let mut b = (first.longitude, first.longitude, first.latitude, first.latitude);
    for p in &ring[1..] {
        b.0 = b.0.min(p.longitude);
        b.1 = b.1.max(p.longitude);
        b.2 = b.2.min(p.latitude);
        b.3 = b.3.max(p.latitude);
    }
    Some(b)
}

#[inline]
fn orientation(a: Position, b: Position, c: Position) -> f64 {
    (b.longitude - a.longitude) * (c.latitude - a.latitude)
        - (b.latitude - a.latitude) * (c.longitude - a.longitude)
}

/// Dot product of (a - b) and (c - b)
#[inline]
fn dot(a: Position, b: Position, c: Position) -> f64 {
    (a.longitude - b.longitude) * (c.longitude - b.longitude)
        + (a.latitude - b.latitude) * (c.latitude - b.latitude)
}

#[inline]
fn on_segment(a: Position, b: Position, p: Position) -> bool {
    p.longitude >= a.longitude.min(b.longitude)
        && p.longitude <= a.longitude.max(b.longitude)
        && p.latitude >= a.latitude.min(b.latitude)
        && p.latitude <= a.latitude.max(b.latitude)
}

fn segments_intersect(p1: Position, p2: Position, q1: Position, q2: Position) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Convert a ring to i_overlay path format (open)
fn ring_to_path(ring: &[Position]) -> Vec<[f64; 2]> {
    open_ring(ring).iter().map(|p| p.to_array()).collect()
}

/// Pieces of a window split meet on ±180 and, when the ring was drawn in
/// [0, 360], on the prime meridian where the 360° cut lands.
#[inline]
fn snap_longitude(longitude: f64, window_split: bool) -> f64 {
    if (longitude - 180.0).abs() < SEAM_SNAP {
        180.0
    } else if (longitude + 180.0).abs() < SEAM_SNAP {
        -180.0
    } else if window_split && longitude.abs() < SEAM_SNAP {
        0.0
    } else {
        longitude
    }
}

/// Convert i_overlay result shapes back to closed rings
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
///
/// Only outer contours are kept, shifted by `-offset` degrees of longitude
/// when they come from a window split.
fn shapes_to_rings(shapes: &[Vec<Vec<[f64; 2]>>], window: Option<f64>) -> Vec<Ring> {
    let offset = window.unwrap_or(0.0);
    shapes
        .iter()
        .filter_map(|shape| shape.first())
        .map(|contour| {
            let ring: Ring = contour
                .iter()
                .map(|p| Position::new(snap_longitude(p[0] - offset, window.is_some()), p[1]))
                .collect();
            close_ring(&dedup_consecutive(&ring))
        })
        .filter(|ring| ring.len() >= 4 && signed_area(ring).abs() > MIN_AREA_THRESHOLD)
        .collect()
}
