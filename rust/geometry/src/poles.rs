// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pole handling
//!
//! Detects polar enclosure with a [`SphericalPolygon`] and rewrites rings
//! that enclose a pole so that they read correctly on an equirectangular
//! plane: the ring leaves the seam, climbs to latitude ±90, runs along the
//! pole line and comes back down on the other side of the seam.

use crate::rebase::NUDGED_FULL_TURN;
use crate::ring_repair::{close_ring, dedup_consecutive, signed_area};
use crate::spherical::SphericalPolygon;
use geoseam_core::{Position, Ring, NORTH_POLE_LATITUDE};
use tracing::warn;

pub const NORTH_POLE: Position = Position::new(0.0, NORTH_POLE_LATITUDE);
pub const SOUTH_POLE: Position = Position::new(0.0, -NORTH_POLE_LATITUDE);

/// Which poles a ring encloses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoleInclusion {
    pub north: bool,
    pub south: bool,
}

impl PoleInclusion {
    pub const NONE: PoleInclusion = PoleInclusion { north: false, south: false };

    pub fn any(&self) -> bool {
        self.north || self.south
    }

    pub fn both(&self) -> bool {
        self.north && self.south
    }
}

/// Classify both poles against a ring.
///
/// The ring is read as a spherical region with its interior on the left.
/// A ring whose longitudes span a full turn while staying in one hemisphere
/// (typically `-180 .. 180` at constant latitude) collapses on the sphere,
/// so it is taken to enclose that hemisphere's pole.
pub fn detect_poles(ring: &[Position]) -> PoleInclusion {
    let polygon = SphericalPolygon::from_ring(ring);
    let mut inclusion = PoleInclusion {
        north: polygon.contains(NORTH_POLE),
        south: polygon.contains(SOUTH_POLE),
    };

    if let Some((min, max)) = longitude_bounds(ring) {
        if max - min >= 360.0 {
            if ring.iter().all(|p| p.latitude >= 0.0) {
                inclusion = PoleInclusion { north: true, south: false };
            } else if ring.iter().all(|p| p.latitude <= 0.0) {
                inclusion = PoleInclusion { north: false, south: true };
            }
        }
    }

    if inclusion.both() {
        warn!("Both poles are inside the polygon, pole caps may be wrong");
    }
    inclusion
}

/// Number of times a ring winds eastward around the polar axis, following
/// the shorter way around between consecutive vertices
pub fn longitude_winding(ring: &[Position]) -> i64 {
    let closed = close_ring(ring);
    let total: f64 = closed
        .windows(2)
        .map(|w| wrap_delta(w[1].longitude - w[0].longitude))
        .sum();
    (total / 360.0).round() as i64
}

pub fn encircles_axis(ring: &[Position]) -> bool {
    longitude_winding(ring) != 0
}

/// Reverse a clockwise ring that does not go around the polar axis.
///
/// Read with its interior on the left, such a ring would describe the rest
/// of the sphere and enclose both poles.
pub fn orient_counter_clockwise(ring: &[Position]) -> Ring {
    if encircles_axis(ring) || signed_area(&continuous_longitudes(ring)) >= 0.0 {
        ring.to_vec()
    } else {
        ring.iter().rev().copied().collect()
    }
}

/// Insert polar caps for the enclosed poles.
///
/// A pole whose latitude already appears on the ring is left alone. The
/// returned ring is closed and has no consecutive duplicates.
pub fn augment_with_caps(ring: &[Position], inclusion: PoleInclusion) -> Ring {
    let touches = |latitude: f64| ring.iter().any(|p| p.latitude == latitude);
    let mut result = close_ring(ring);

    if inclusion.both() {
        warn!("Adding caps for both poles, the result is best-effort");
    }
    if inclusion.south && !touches(-NORTH_POLE_LATITUDE) {
        let reflected = reflect(&result);
        let capped = north_cap(&reflected);
        result = reflect(&capped).into_iter().rev().collect();
    }
    if inclusion.north && !touches(NORTH_POLE_LATITUDE) {
        result = north_cap(&result);
    }
    result
}

fn reflect(ring: &[Position]) -> Ring {
    ring.iter().map(|p| p.with_latitude(-p.latitude)).collect()
}

/// Cap the north pole of a closed ring.
fn north_cap(ring: &[Position]) -> Ring {
    let open = match ring.split_last() {
        Some((last, rest)) if rest.first() == Some(last) => rest,
        _ => ring,
    };
    let n = open.len();
    if n < 2 {
        return ring.to_vec();
    }

    // Frame and its (east, west) cut longitudes
    let frame = if open.iter().any(|p| p.longitude > 180.0) {
        Frame { east_cut: NUDGED_FULL_TURN, west_cut: 0.0, east: 360.0, west: 0.0 }
    } else {
        Frame { east_cut: 180.0, west_cut: -180.0, east: 180.0, west: -180.0 }
    };

    let mut top = 0;
    for (i, p) in open.iter().enumerate() {
        if p.latitude > open[top].latitude {
            top = i;
        }
    }

    let seam = (0..n)
        .map(|j| (top + j) % n)
        .find(|&i| (open[(i + 1) % n].longitude - open[i].longitude).abs() > 180.0);
    let Some(index) = seam else {
        warn!("No seam crossing found next to the pole, ring left as is");
        return ring.to_vec();
    };

    let right = open[index];
    let left = open[(index + 1) % n];
    let eastward = left.longitude < right.longitude;
    let (right_cut, left_cut, seam_longitude, left_unwrapped) = if eastward {
        (frame.east_cut, frame.west_cut, frame.east, left.longitude + 360.0)
    } else {
        (frame.west_cut, frame.east_cut, frame.west, left.longitude - 360.0)
    };

    let latitude = if right.latitude == left.latitude {
        right.latitude
    } else {
        right.latitude
            + (left.latitude - right.latitude) * (seam_longitude - right.longitude)
                / (left_unwrapped - right.longitude)
    };

    let mut capped: Ring = Vec::with_capacity(n + 5);
    capped.extend_from_slice(&open[..=index]);
    capped.push(Position::new(right_cut, latitude));
    capped.push(Position::new(right_cut, NORTH_POLE_LATITUDE));
    capped.push(Position::new(left_cut, NORTH_POLE_LATITUDE));
    capped.push(Position::new(left_cut, latitude));
    capped.extend_from_slice(&open[index + 1..]);

    let mut capped = dedup_consecutive(&capped);
    while capped.len() > 1 && capped.first() == capped.last() {
        capped.pop();
    }
    close_ring(&capped)
}

struct Frame {
    east_cut: f64,
    west_cut: f64,
    east: f64,
    west: f64,
}

fn wrap_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Longitudes rewritten so consecutive vertices differ by at most 180°
fn continuous_longitudes(ring: &[Position]) -> Ring {
    let mut out: Ring = Vec::with_capacity(ring.len());
    for p in ring {
        let longitude = match out.last() {
            Some(prev) => prev.longitude + wrap_delta(p.longitude - prev.longitude),
            None => p.longitude,
        };
        out.push(p.with_longitude(longitude));
    }
    out
}

fn longitude_bounds(ring: &[Position]) -> Option<(f64, f64)> {
    ring.iter().fold(None, |acc, p| match acc {
        None => Some((p.longitude, p.longitude)),
        Some((min, max)) => Some((min.min(p.longitude), max.max(p.longitude))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(points: &[(f64, f64)]) -> Ring {
        points.iter().copied().map(Position::from).collect()
    }

    /// Ursa Minor, hours turned into degrees
    fn ursa_minor(right: (f64, f64), left: (f64, f64), shift: f64) -> Ring {
        let mut points = vec![
            (195.0, 77.0),
            (195.0, 70.0),
            (210.0, 70.0),
            (210.0, 66.0),
            (235.00005, 66.0),
            (235.00005, 70.0),
            (247.99995, 70.0),
            (247.99995, 75.0),
            (262.5, 75.0),
            (262.5, 80.0),
            (270.0, 80.0),
            (270.0, 86.0),
            (315.0, 86.0),
            (315.0, 86.16666),
            (345.0, 86.16666),
            right,
            left,
            (120.0, 86.5),
            (217.5, 86.5),
            (217.5, 80.0),
            (203.74995, 80.0),
            (203.74995, 77.0),
        ];
        for (i, p) in points.iter_mut().enumerate() {
            if i != 15 && i != 16 {
                p.1 -= shift;
            }
        }
        close_ring(&ring(&points))
    }

    #[test]
    fn test_square_below_pole() {
        let square =
            ring(&[(-10.0, 80.0), (10.0, 80.0), (10.0, 85.0), (-10.0, 85.0), (-10.0, 80.0)]);
        assert_eq!(detect_poles(&square), PoleInclusion::NONE);
    }

    #[test]
    fn test_full_span_ring_encloses_north_pole() {
        let span = ring(&[(-180.0, 89.0), (180.0, 89.0), (180.0, 89.0), (-180.0, 89.0)]);
        let inclusion = detect_poles(&span);
        assert!(inclusion.north);
        assert!(!inclusion.south);

        let capped = augment_with_caps(&span, inclusion);
        assert_eq!(
            capped,
            ring(&[(-180.0, 89.0), (-180.0, 90.0), (180.0, 90.0), (180.0, 89.0), (-180.0, 89.0)])
        );
        assert!(capped.iter().any(|p| p.latitude == 90.0));
    }

    #[test]
    fn test_ursa_minor_equal_border_latitudes() {
        let constellation = ursa_minor((345.0, 88.0), (120.0, 88.0), 0.0);
        let inclusion = detect_poles(&constellation);
        assert!(inclusion.north);
        assert!(!inclusion.south);

        let capped = augment_with_caps(&constellation, inclusion);
        assert_eq!(capped.len(), constellation.len() + 4);
        assert_eq!(
            &capped[15..21],
            &ring(&[
                (345.0, 88.0),
                (359.999999999999, 88.0),
                (359.999999999999, 90.0),
                (0.0, 90.0),
                (0.0, 88.0),
                (120.0, 88.0),
            ])[..]
        );
        assert_eq!(capped.first(), capped.last());
    }

    #[test]
    fn test_ursa_minor_right_border_higher() {
        let constellation = ursa_minor((345.0, 75.0), (120.0, 68.0), 20.0);
        let capped = augment_with_caps(&constellation, detect_poles(&constellation));
        assert_relative_eq!(capped[16].latitude, 74.22222222222227, epsilon = 1e-9);
        assert_eq!(capped[16].longitude, 359.999999999999);
        assert_eq!(capped[17], Position::new(359.999999999999, 90.0));
        assert_eq!(capped[18], Position::new(0.0, 90.0));
        assert_eq!(capped[19].longitude, 0.0);
        assert_relative_eq!(capped[19].latitude, 74.22222222222227, epsilon = 1e-9);
        assert_eq!(capped[20], Position::new(120.0, 68.0));
    }

    #[test]
    fn test_ursa_minor_right_border_lower() {
        let constellation = ursa_minor((345.0, 68.0), (120.0, 75.0), 20.0);
        let capped = augment_with_caps(&constellation, detect_poles(&constellation));
        assert_relative_eq!(capped[16].latitude, 68.77777777777773, epsilon = 1e-9);
        assert_relative_eq!(capped[19].latitude, 68.77777777777773, epsilon = 1e-9);
        assert_eq!(capped[20], Position::new(120.0, 75.0));
    }

    #[test]
    fn test_south_cap_mirrors_north() {
        // Westward at -70, the south pole is on the left
        let around =
            ring(&[(0.0, -70.0), (-90.0, -70.0), (180.0, -70.0), (90.0, -70.0), (0.0, -70.0)]);
        let inclusion = detect_poles(&around);
        assert_eq!(inclusion, PoleInclusion { north: false, south: true });

        let capped = augment_with_caps(&around, inclusion);
        assert_eq!(capped.first(), capped.last());
        assert_eq!(capped.iter().filter(|p| p.latitude == -90.0).count(), 2);
        let north_only = PoleInclusion { north: true, south: false };
        let mirrored = augment_with_caps(&reflect(&around), north_only);
        let expected: Ring = reflect(&mirrored).into_iter().rev().collect();
        assert_eq!(capped, expected);
    }

    #[test]
    fn test_ring_through_pole_is_untouched() {
        let through = ring(&[(0.0, 80.0), (90.0, 90.0), (180.0, 80.0), (-90.0, 80.0), (0.0, 80.0)]);
        let inclusion = PoleInclusion { north: true, south: false };
        assert_eq!(augment_with_caps(&through, inclusion), through);
    }

    #[test]
    fn test_both_poles_best_effort() {
        // Clockwise square read as its complement: both poles inside
        let square =
            ring(&[(-10.0, 80.0), (-10.0, 85.0), (10.0, 85.0), (10.0, 80.0), (-10.0, 80.0)]);
        let inclusion = detect_poles(&square);
        assert!(inclusion.both());

        // No seam edge on either side; the ring only gets closed
        let capped = augment_with_caps(&square, inclusion);
        assert_eq!(capped.first(), capped.last());
        assert_eq!(capped.len(), square.len());
    }

    #[test]
    fn test_orientation_and_winding() {
        let clockwise =
            ring(&[(-10.0, 80.0), (-10.0, 85.0), (10.0, 85.0), (10.0, 80.0), (-10.0, 80.0)]);
        assert_eq!(longitude_winding(&clockwise), 0);
        let fixed = orient_counter_clockwise(&clockwise);
        assert_eq!(detect_poles(&fixed), PoleInclusion::NONE);

        let around = ring(&[(0.0, 70.0), (90.0, 70.0), (180.0, 70.0), (-90.0, 70.0), (0.0, 70.0)]);
        assert_eq!(longitude_winding(&around), 1);
        assert_eq!(orient_counter_clockwise(&around), around);

        // Clockwise across the antimeridian
        let seam =
            ring(&[(170.0, 0.0), (170.0, 10.0), (-170.0, 10.0), (-170.0, 0.0), (170.0, 0.0)]);
        assert!(!encircles_axis(&seam));
        assert_eq!(orient_counter_clockwise(&seam)[1], Position::new(-170.0, 0.0));
    }
}
