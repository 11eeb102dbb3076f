// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry dispatch
//!
//! Normalization and reprojection implemented as [`GeometryVisitor`]s, one
//! method per geometry kind.

use crate::config::NormalizationConfig;
use crate::error::Result;
use crate::line_split::split_line;
use crate::registry::{CoordinateTransform, CrsRegistry};
use crate::sanitizer::sanitize_polygon;
use geoseam_core::{Crs, Geometry, GeometryVisitor, PolygonCoordinates, Position};

/// Normalizes geometries for an equirectangular index.
///
/// - line strings are cut at the antimeridian
/// - polygons and multi-polygons become multi-polygons of sanitized rings
/// - every other kind is returned as is
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryNormalizer {
    config: NormalizationConfig,
}

impl GeometryNormalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn normalize(&self, geometry: &Geometry) -> Result<Geometry> {
        geometry.accept(self)
    }
}

impl GeometryVisitor for GeometryNormalizer {
    type Output = Result<Geometry>;

    fn visit_point(&self, point: &Position) -> Self::Output {
        Ok(Geometry::Point(*point))
    }

    fn visit_multi_point(&self, points: &[Position]) -> Self::Output {
        Ok(Geometry::MultiPoint(points.to_vec()))
    }

    fn visit_line_string(&self, line: &[Position]) -> Self::Output {
        Ok(split_line(line))
    }

    fn visit_multi_line_string(&self, lines: &[Vec<Position>]) -> Self::Output {
        Ok(Geometry::MultiLineString(lines.to_vec()))
    }

    fn visit_polygon(&self, polygon: &PolygonCoordinates) -> Self::Output {
        Ok(Geometry::MultiPolygon(sanitize_polygon(polygon, &self.config)?))
    }

    fn visit_multi_polygon(&self, polygons: &[PolygonCoordinates]) -> Self::Output {
        let mut sanitized = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            sanitized.extend(sanitize_polygon(polygon, &self.config)?);
        }
        Ok(Geometry::MultiPolygon(sanitized))
    }

    fn visit_geometry_collection(&self, geometries: &[Geometry]) -> Self::Output {
        Ok(Geometry::GeometryCollection(geometries.to_vec()))
    }

    fn visit_unlocated(&self) -> Self::Output {
        Ok(Geometry::Unlocated)
    }
}

/// Reprojects every coordinate of a geometry with one [`CoordinateTransform`]
struct Transformer {
    transform: CoordinateTransform,
}

impl Transformer {
    fn polygon(&self, polygon: &PolygonCoordinates) -> PolygonCoordinates {
        PolygonCoordinates::with_holes(
            self.transform.apply_all(&polygon.exterior),
            polygon.holes.iter().map(|h| self.transform.apply_all(h)).collect(),
        )
    }
}

impl GeometryVisitor for Transformer {
    type Output = Geometry;

    fn visit_point(&self, point: &Position) -> Geometry {
        Geometry::Point(self.transform.apply(*point))
    }

    fn visit_multi_point(&self, points: &[Position]) -> Geometry {
        Geometry::MultiPoint(self.transform.apply_all(points))
    }

    fn visit_line_string(&self, line: &[Position]) -> Geometry {
        Geometry::LineString(self.transform.apply_all(line))
    }

    fn visit_multi_line_string(&self, lines: &[Vec<Position>]) -> Geometry {
        Geometry::MultiLineString(lines.iter().map(|l| self.transform.apply_all(l)).collect())
    }

    fn visit_polygon(&self, polygon: &PolygonCoordinates) -> Geometry {
        Geometry::Polygon(self.polygon(polygon))
    }

    fn visit_multi_polygon(&self, polygons: &[PolygonCoordinates]) -> Geometry {
        Geometry::MultiPolygon(polygons.iter().map(|p| self.polygon(p)).collect())
    }

    fn visit_geometry_collection(&self, geometries: &[Geometry]) -> Geometry {
        Geometry::GeometryCollection(geometries.iter().map(|g| g.accept(self)).collect())
    }

    fn visit_unlocated(&self) -> Geometry {
        Geometry::Unlocated
    }
}

/// Reproject a geometry from `from` to `to` using `registry`.
///
/// `Unlocated` maps to itself whatever the systems.
///
/// # Errors
///
/// [`Error::Transform`](crate::Error::Transform) when the registry has no
/// transform between the two systems.
pub fn transform_with(
    registry: &CrsRegistry,
    geometry: &Geometry,
    from: Crs,
    to: Crs,
) -> Result<Geometry> {
    if geometry.is_unlocated() {
        return Ok(Geometry::Unlocated);
    }
    let transformer = Transformer {
        transform: registry.coordinate_transform(from, to)?,
    };
    Ok(geometry.accept(&transformer))
}

/// Reproject a geometry with the process-wide registry
pub fn transform(geometry: &Geometry, from: Crs, to: Crs) -> Result<Geometry> {
    transform_with(CrsRegistry::global(), geometry, from, to)
}

/// Normalize a geometry with the default configuration
pub fn normalize(geometry: &Geometry) -> Result<Geometry> {
    GeometryNormalizer::default().normalize(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;

    fn positions(geometry: &Geometry) -> Vec<Position> {
        match geometry {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.clone(),
            Geometry::MultiLineString(lines) => lines.concat(),
            Geometry::Polygon(polygon) => polygon.rings().flatten().copied().collect(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|p| p.rings().flatten().copied())
                .collect(),
            Geometry::GeometryCollection(members) => members.iter().flat_map(positions).collect(),
            Geometry::Unlocated => Vec::new(),
        }
    }

    #[test]
    fn test_points_are_untouched() {
        let point = Geometry::point(200.0, 10.0);
        assert_eq!(normalize(&point).unwrap(), point);
        let points = Geometry::multi_point(&[(10.0, 10.0), (-170.0, 5.0)]);
        assert_eq!(normalize(&points).unwrap(), points);
        assert_eq!(normalize(&Geometry::Unlocated).unwrap(), Geometry::Unlocated);
    }

    #[test]
    fn test_line_string_is_split() {
        let line = Geometry::line_string(&[(170.0, 0.0), (-170.0, 0.0)]);
        let Geometry::MultiLineString(parts) = normalize(&line).unwrap() else {
            panic!("expected a multi-line");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].last(), Some(&Position::new(180.0, 0.0)));
        assert_eq!(parts[1].first(), Some(&Position::new(-180.0, 0.0)));
    }

    #[test]
    fn test_polygon_becomes_multi_polygon() {
        let square =
            Geometry::simple_polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let Geometry::MultiPolygon(members) = normalize(&square).unwrap() else {
            panic!("expected a multi-polygon");
        };
        assert_eq!(members.len(), 1);
        assert_eq!(Geometry::Polygon(members[0].clone()), square);
    }

    #[test]
    fn test_multi_polygon_members_are_flattened() {
        let square = |lon: f64| {
            PolygonCoordinates::new(vec![
                Position::new(lon, 0.0),
                Position::new(lon + 20.0, 0.0),
                Position::new(lon + 20.0, 10.0),
                Position::new(lon, 10.0),
                Position::new(lon, 0.0),
            ])
        };
        let multi = Geometry::MultiPolygon(vec![square(0.0), square(170.0)]);
        let Geometry::MultiPolygon(members) = normalize(&multi).unwrap() else {
            panic!("expected a multi-polygon");
        };
        assert_eq!(members.len(), 3);
    }

    #[test]
    fn test_degenerate_polygon_is_an_error() {
        let sliver = Geometry::simple_polygon(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(normalize(&sliver), Err(Error::RingRepair(_))));
    }

    #[test]
    fn test_transform_keeps_shape() {
        let collection = Geometry::GeometryCollection(vec![
            Geometry::point(10.0, 45.0),
            Geometry::line_string(&[(0.0, 10.0), (5.0, 20.0)]),
            Geometry::simple_polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            Geometry::Unlocated,
        ]);
        let mars = transform(&collection, Crs::Wgs84, Crs::Mars49900).unwrap();
        let Geometry::GeometryCollection(members) = &mars else {
            panic!("expected a collection");
        };
        let kinds: Vec<_> = members.iter().map(Geometry::kind).collect();
        let expected: Vec<_> = match &collection {
            Geometry::GeometryCollection(m) => m.iter().map(Geometry::kind).collect(),
            _ => unreachable!(),
        };
        assert_eq!(kinds, expected);

        let before = positions(&collection);
        let after = positions(&mars);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.longitude, a.longitude);
        }
        // Mars is flatter: same geocentric ray, higher geodetic latitude
        assert!(after[0].latitude > 45.0);
    }

    #[test]
    fn test_transform_round_trip() {
        let polygon = Geometry::simple_polygon(&[(-20.0, -60.0), (30.0, -10.0), (40.0, 75.0)]);
        for from in Crs::all() {
            for to in Crs::all() {
                let there = transform(&polygon, from, to).unwrap();
                let back = transform(&there, to, from).unwrap();
                for (a, b) in positions(&polygon).iter().zip(positions(&back)) {
                    assert_abs_diff_eq!(a.longitude, b.longitude, epsilon = 1e-9);
                    assert_abs_diff_eq!(a.latitude, b.latitude, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_unlocated_transform_ignores_registry() {
        let empty = CrsRegistry::from_definitions(std::iter::empty::<(Crs, &str)>()).unwrap();
        let out = transform_with(&empty, &Geometry::Unlocated, Crs::Wgs84, Crs::Astro);
        assert_eq!(out.unwrap(), Geometry::Unlocated);
        let point = transform_with(&empty, &Geometry::point(0.0, 0.0), Crs::Wgs84, Crs::Astro);
        assert_eq!(
            point.unwrap_err(),
            Error::Transform {
                from: Crs::Wgs84,
                to: Crs::Astro
            }
        );
    }
}
