// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spherical polygons
//!
//! A ring rendered on the unit sphere, used to decide whether a point (in
//! practice, a pole) lies inside the region on the left of the ring.

use geoseam_core::Position;
use nalgebra::Vector3;
use std::f64::consts::{PI, TAU};

/// Tolerance on unit vectors
const EPSILON: f64 = 1e-12;

/// Location of a point relative to a spherical polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Convert a position to a point on the unit sphere.
///
/// Longitude is the azimuth angle and colatitude (90° - latitude) the polar angle.
pub fn to_unit_vector(position: Position) -> Vector3<f64> {
    let azimuth = position.longitude.to_radians().rem_euclid(TAU);
    let polar = (90.0 - position.latitude).to_radians().clamp(0.0, PI);
    let (sin_polar, cos_polar) = polar.sin_cos();
    Vector3::new(sin_polar * azimuth.cos(), sin_polar * azimuth.sin(), cos_polar)
}

/// Polygon on the unit sphere whose interior lies on the left of its edges
#[derive(Debug, Clone)]
pub struct SphericalPolygon {
    vertices: Vec<Vector3<f64>>,
}

impl SphericalPolygon {
    /// Build from a ring (open or closed); repeated consecutive points,
    /// including -180/180 pairs at the same latitude, collapse into one vertex
    pub fn from_ring(ring: &[Position]) -> Self {
        let mut vertices: Vec<Vector3<f64>> = Vec::with_capacity(ring.len());
        for v in ring.iter().map(|p| to_unit_vector(*p)) {
            if vertices.last().map_or(true, |last| (last - v).norm() > EPSILON) {
                vertices.push(v);
            }
        }
        while vertices.len() > 1
            && (vertices[0] - vertices[vertices.len() - 1]).norm() <= EPSILON
        {
            vertices.pop();
        }
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Area of the region on the left of the ring (Gauss-Bonnet), in steradians
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut turning = 0.0;
        for i in 0..n {
            let a = self.vertices[(i + n - 1) % n];
            let b = self.vertices[i];
            let c = self.vertices[(i + 1) % n];
            let incoming = a.cross(&b).cross(&b);
            let outgoing = b.cross(&c).cross(&b);
            turning += b.dot(&incoming.cross(&outgoing)).atan2(incoming.dot(&outgoing));
        }
        TAU - turning
    }

    /// Locate a point relative to the polygon
    pub fn classify(&self, point: Position) -> Location {
        if self.vertices.len() < 3 {
            return Location::Outside;
        }
        let p = to_unit_vector(point);

        if self.vertices.iter().any(|v| (v - p).norm() <= EPSILON) {
            return Location::Boundary;
        }

        // Vertices antipodal to p have no direction seen from p
        let projected: Vec<Vector3<f64>> = self
            .vertices
            .iter()
            .map(|v| v - p * v.dot(&p))
            .filter(|v| v.norm() > EPSILON)
            .collect();
        if projected.len() < 2 {
            return Location::Outside;
        }

        let n = self.vertices.len();
        for i in 0..n {
            if on_arc(self.vertices[i], self.vertices[(i + 1) % n], p) {
                return Location::Boundary;
            }
        }

        let m = projected.len();
        let winding: f64 = (0..m)
            .map(|i| {
                let a = projected[i];
                let b = projected[(i + 1) % m];
                p.dot(&a.cross(&b)).atan2(a.dot(&b))
            })
            .sum();

        match (winding / TAU).round() as i64 {
            w if w > 0 => Location::Inside,
            w if w < 0 => Location::Outside,
            _ if self.area() > TAU => Location::Inside,
            _ => Location::Outside,
        }
    }

    pub fn contains(&self, point: Position) -> bool {
        self.classify(point) == Location::Inside
    }
}

/// Whether p lies on the minor great-circle arc from a to b
fn on_arc(a: Vector3<f64>, b: Vector3<f64>, p: Vector3<f64>) -> bool {
    let normal = a.cross(&b);
    let length = normal.norm();
    if length <= EPSILON {
        return false;
    }
    p.dot(&normal).abs() <= EPSILON * length
        && a.cross(&p).dot(&normal) > 0.0
        && p.cross(&b).dot(&normal) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NORTH: Position = Position::new(0.0, 90.0);
    const SOUTH: Position = Position::new(0.0, -90.0);

    fn polygon(points: &[(f64, f64)]) -> SphericalPolygon {
        let ring: Vec<Position> = points.iter().copied().map(Position::from).collect();
        SphericalPolygon::from_ring(&ring)
    }

    #[test]
    fn test_unit_vectors() {
        let v = to_unit_vector(Position::new(90.0, 0.0));
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        let pole = to_unit_vector(NORTH);
        assert_relative_eq!(pole, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_small_square_excludes_poles() {
        let square =
            polygon(&[(-10.0, 80.0), (10.0, 80.0), (10.0, 85.0), (-10.0, 85.0), (-10.0, 80.0)]);
        assert_eq!(square.classify(NORTH), Location::Outside);
        assert_eq!(square.classify(SOUTH), Location::Outside);
        assert_eq!(square.classify(Position::new(0.0, 82.0)), Location::Inside);
    }

    #[test]
    fn test_clockwise_square_is_the_complement() {
        let square =
            polygon(&[(-10.0, 80.0), (-10.0, 85.0), (10.0, 85.0), (10.0, 80.0), (-10.0, 80.0)]);
        assert_eq!(square.classify(NORTH), Location::Inside);
        assert_eq!(square.classify(SOUTH), Location::Inside);
        assert_eq!(square.classify(Position::new(0.0, 82.0)), Location::Outside);
    }

    #[test]
    fn test_ring_around_north_pole() {
        let cap = polygon(&[(0.0, 70.0), (90.0, 70.0), (180.0, 70.0), (-90.0, 70.0), (0.0, 70.0)]);
        assert_eq!(cap.classify(NORTH), Location::Inside);
        assert_eq!(cap.classify(SOUTH), Location::Outside);

        let reversed =
            polygon(&[(0.0, 70.0), (-90.0, 70.0), (180.0, 70.0), (90.0, 70.0), (0.0, 70.0)]);
        assert_eq!(reversed.classify(NORTH), Location::Outside);
        assert_eq!(reversed.classify(SOUTH), Location::Inside);
    }

    #[test]
    fn test_boundary() {
        let through_pole = polygon(&[(0.0, 80.0), (0.0, 90.0), (90.0, 80.0), (0.0, 80.0)]);
        assert_eq!(through_pole.classify(NORTH), Location::Boundary);

        let triangle = polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (0.0, 0.0)]);
        assert_eq!(triangle.classify(Position::new(5.0, 0.0)), Location::Boundary);
    }

    #[test]
    fn test_area() {
        // Northern hemisphere, counter-clockwise seen from above
        let hemisphere = polygon(&[(0.0, 0.0), (90.0, 0.0), (180.0, 0.0), (-90.0, 0.0)]);
        assert_relative_eq!(hemisphere.area(), TAU, epsilon = 1e-9);

        // Octant
        let octant = polygon(&[(0.0, 0.0), (90.0, 0.0), (0.0, 90.0)]);
        assert_relative_eq!(octant.area(), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_seam_duplicates_collapse() {
        let ring = polygon(&[(-180.0, 89.0), (180.0, 89.0), (180.0, 89.0), (-180.0, 89.0)]);
        assert_eq!(ring.len(), 1);
    }
}
