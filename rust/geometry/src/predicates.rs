// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial predicate helpers
//!
//! Distances from a query point to a geometry. Lines and polygon boundaries
//! are sampled at ten evenly spaced positions per segment (both ends
//! included) and the nearest sample wins, which overestimates the true
//! point-to-segment distance on long segments.

use crate::error::Result;
use crate::geodesic::GeodeticCalculator;
use crate::registry::CrsRegistry;
use geoseam_core::{Crs, Geometry, GeometryVisitor, PolygonCoordinates, Position};

/// Steps per segment when sampling a boundary
const SEGMENT_STEPS: usize = 9;

/// Positions evenly spaced from `from` to `to`, both included
pub fn intermediate_positions(from: Position, to: Position) -> impl Iterator<Item = Position> {
    let lon_step = (to.longitude - from.longitude) / SEGMENT_STEPS as f64;
    let lat_step = (to.latitude - from.latitude) / SEGMENT_STEPS as f64;
    (0..=SEGMENT_STEPS).map(move |n| match n {
        0 => from,
        SEGMENT_STEPS => to,
        _ => Position::new(
            from.longitude + n as f64 * lon_step,
            from.latitude + n as f64 * lat_step,
        ),
    })
}

fn sampled(path: &[Position]) -> impl Iterator<Item = Position> + '_ {
    let single = (path.len() == 1).then(|| path[0]);
    path.windows(2)
        .flat_map(|w| intermediate_positions(w[0], w[1]))
        .chain(single)
}

fn min_option(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().reduce(f64::min)
}

/// Smallest distance from a point to a geometry
struct DistanceToPoint<'a> {
    calculator: &'a GeodeticCalculator,
    point: Position,
}

impl DistanceToPoint<'_> {
    fn nearest(&self, positions: impl Iterator<Item = Position>) -> Option<f64> {
        positions
            .map(|p| self.calculator.distance(self.point, p))
            .reduce(f64::min)
    }
}

impl GeometryVisitor for DistanceToPoint<'_> {
    type Output = Option<f64>;

    fn visit_point(&self, point: &Position) -> Option<f64> {
        Some(self.calculator.distance(self.point, *point))
    }

    fn visit_multi_point(&self, points: &[Position]) -> Option<f64> {
        self.nearest(points.iter().copied())
    }

    fn visit_line_string(&self, line: &[Position]) -> Option<f64> {
        self.nearest(sampled(line))
    }

    fn visit_multi_line_string(&self, lines: &[Vec<Position>]) -> Option<f64> {
        min_option(lines.iter().map(|l| self.visit_line_string(l)))
    }

    fn visit_polygon(&self, polygon: &PolygonCoordinates) -> Option<f64> {
        self.nearest(sampled(&polygon.exterior))
    }

    fn visit_multi_polygon(&self, polygons: &[PolygonCoordinates]) -> Option<f64> {
        min_option(polygons.iter().map(|p| self.visit_polygon(p)))
    }

    fn visit_geometry_collection(&self, geometries: &[Geometry]) -> Option<f64> {
        min_option(geometries.iter().map(|g| g.accept(self)))
    }

    fn visit_unlocated(&self) -> Option<f64> {
        None
    }
}

/// Whether some sample of a geometry is strictly closer than a distance
struct WithinDistance<'a> {
    calculator: &'a GeodeticCalculator,
    point: Position,
    distance: f64,
}

impl WithinDistance<'_> {
    fn any_near(&self, mut positions: impl Iterator<Item = Position>) -> bool {
        positions.any(|p| self.calculator.distance(self.point, p) < self.distance)
    }
}

impl GeometryVisitor for WithinDistance<'_> {
    type Output = bool;

    fn visit_point(&self, point: &Position) -> bool {
        self.any_near(std::iter::once(*point))
    }

    fn visit_multi_point(&self, points: &[Position]) -> bool {
        self.any_near(points.iter().copied())
    }

    fn visit_line_string(&self, line: &[Position]) -> bool {
        self.any_near(sampled(line))
    }

    fn visit_multi_line_string(&self, lines: &[Vec<Position>]) -> bool {
        lines.iter().any(|l| self.visit_line_string(l))
    }

    fn visit_polygon(&self, polygon: &PolygonCoordinates) -> bool {
        self.any_near(sampled(&polygon.exterior))
    }

    fn visit_multi_polygon(&self, polygons: &[PolygonCoordinates]) -> bool {
        polygons.iter().any(|p| self.visit_polygon(p))
    }

    fn visit_geometry_collection(&self, geometries: &[Geometry]) -> bool {
        geometries.iter().any(|g| g.accept(self))
    }

    fn visit_unlocated(&self) -> bool {
        false
    }
}

/// Distance in meters from `point` to `shape`, `None` for an unlocated or
/// empty shape
pub fn distance_to_point_with(
    registry: &CrsRegistry,
    shape: &Geometry,
    point: Position,
    crs: Crs,
) -> Result<Option<f64>> {
    let visitor = DistanceToPoint {
        calculator: registry.calculator(crs)?,
        point,
    };
    Ok(shape.accept(&visitor))
}

/// Whether `shape` comes strictly closer than `distance` meters to `point`
pub fn is_within_distance_with(
    registry: &CrsRegistry,
    shape: &Geometry,
    point: Position,
    distance: f64,
    crs: Crs,
) -> Result<bool> {
    let visitor = WithinDistance {
        calculator: registry.calculator(crs)?,
        point,
        distance,
    };
    Ok(shape.accept(&visitor))
}

/// [`distance_to_point_with`] on the process-wide registry
pub fn distance_to_point(shape: &Geometry, point: Position, crs: Crs) -> Result<Option<f64>> {
    distance_to_point_with(CrsRegistry::global(), shape, point, crs)
}

/// [`is_within_distance_with`] on the process-wide registry
pub fn is_within_distance(
    shape: &Geometry,
    point: Position,
    distance: f64,
    crs: Crs,
) -> Result<bool> {
    is_within_distance_with(CrsRegistry::global(), shape, point, distance, crs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    #[test]
    fn test_intermediate_positions() {
        let samples: Vec<Position> =
            intermediate_positions(Position::new(0.0, 0.0), Position::new(9.0, 18.0)).collect();
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0], Position::new(0.0, 0.0));
        assert_eq!(samples[9], Position::new(9.0, 18.0));
        assert_relative_eq!(samples[4].longitude, 4.0, epsilon = 1e-12);
        assert_relative_eq!(samples[4].latitude, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_distance_is_exact() {
        let d = distance_to_point(&Geometry::point(0.0, 1.0), Position::new(0.0, 0.0), Crs::Wgs84)
            .unwrap()
            .unwrap();
        assert_relative_eq!(d, 110_574.389, epsilon = 0.01);
    }

    #[test]
    fn test_polygon_boundary_sampling() {
        // Query point on the middle of the bottom edge, between two samples
        let square =
            Geometry::simple_polygon(&[(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (0.0, 9.0)]);
        let on_edge = Position::new(4.5, 0.0);
        let d = distance_to_point(&square, on_edge, Crs::Astro).unwrap().unwrap();
        let half_degree = 0.5_f64.to_radians() * geoseam_core::AUTHALIC_SPHERE_RADIUS;
        assert_relative_eq!(d, half_degree, max_relative = 1e-9);

        // Sample at (4, 0) is about 55.6 km away
        assert!(is_within_distance(&square, on_edge, 56_000.0, Crs::Astro).unwrap());
        assert!(!is_within_distance(&square, on_edge, 55_000.0, Crs::Astro).unwrap());
    }

    #[test]
    fn test_strict_comparison() {
        let point = Geometry::point(0.0, 0.0);
        let d = distance_to_point(&point, Position::new(1.0, 0.0), Crs::Wgs84)
            .unwrap()
            .unwrap();
        assert!(!is_within_distance(&point, Position::new(1.0, 0.0), d, Crs::Wgs84).unwrap());
        assert!(is_within_distance(&point, Position::new(1.0, 0.0), d + 1.0, Crs::Wgs84).unwrap());
    }

    #[test]
    fn test_collections_take_the_minimum() {
        let collection = Geometry::GeometryCollection(vec![
            Geometry::point(10.0, 0.0),
            Geometry::multi_point(&[(3.0, 0.0), (20.0, 0.0)]),
            Geometry::line_string(&[(0.0, 5.0), (0.0, 50.0)]),
            Geometry::Unlocated,
        ]);
        let origin = Position::new(0.0, 0.0);
        let d = distance_to_point(&collection, origin, Crs::Astro).unwrap().unwrap();
        let three_degrees = 3.0_f64.to_radians() * geoseam_core::AUTHALIC_SPHERE_RADIUS;
        assert_relative_eq!(d, three_degrees, max_relative = 1e-9);
        assert!(is_within_distance(&collection, origin, three_degrees + 1.0, Crs::Astro).unwrap());
    }

    #[test]
    fn test_unlocated() {
        let origin = Position::new(0.0, 0.0);
        assert_eq!(distance_to_point(&Geometry::Unlocated, origin, Crs::Wgs84).unwrap(), None);
        assert!(!is_within_distance(&Geometry::Unlocated, origin, 1e9, Crs::Wgs84).unwrap());
    }

    #[test]
    fn test_missing_calculator() {
        let earth_only =
            CrsRegistry::from_definitions([(Crs::Wgs84, Crs::Wgs84.wkt())]).unwrap();
        let err = distance_to_point_with(
            &earth_only,
            &Geometry::point(0.0, 0.0),
            Position::new(1.0, 1.0),
            Crs::Mars49900,
        )
        .unwrap_err();
        assert_eq!(err, Error::UnsupportedCrs(Crs::Mars49900));
    }
}
