// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry model
//!
//! A closed sum type over the GeoJSON geometry kinds plus [`Geometry::Unlocated`]
//! for values without spatial extent. Geometries are plain values: every
//! operation in the workspace produces a new geometry instead of mutating one.
//!
//! Per-kind operations are written as [`GeometryVisitor`] implementations and
//! dispatched with [`Geometry::accept`].

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A sequence of positions whose first and last entries are equal
pub type Ring = Vec<Position>;

/// Exterior ring plus optional holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Position>>", into = "Vec<Vec<Position>>")]
pub struct PolygonCoordinates {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl PolygonCoordinates {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    #[inline]
    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// All rings, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

impl TryFrom<Vec<Vec<Position>>> for PolygonCoordinates {
    type Error = String;

    fn try_from(mut rings: Vec<Vec<Position>>) -> Result<Self, Self::Error> {
        if rings.is_empty() {
            return Err("a polygon needs at least an exterior ring".to_string());
        }
        let exterior = rings.remove(0);
        Ok(Self {
            exterior,
            holes: rings,
        })
    }
}

impl From<PolygonCoordinates> for Vec<Vec<Position>> {
    fn from(polygon: PolygonCoordinates) -> Self {
        let mut rings = Vec::with_capacity(1 + polygon.holes.len());
        rings.push(polygon.exterior);
        rings.extend(polygon.holes);
        rings
    }
}

/// Geometry kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Unlocated,
}

impl GeometryKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
            GeometryKind::Unlocated => "Unlocated",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometry value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<GeoJsonGeometry>", into = "Option<GeoJsonGeometry>")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(PolygonCoordinates),
    MultiPolygon(Vec<PolygonCoordinates>),
    GeometryCollection(Vec<Geometry>),
    /// No spatial extent
    #[default]
    Unlocated,
}

impl Geometry {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Geometry::Point(Position::new(longitude, latitude))
    }

    pub fn multi_point(points: &[(f64, f64)]) -> Self {
        Geometry::MultiPoint(points.iter().copied().map(Position::from).collect())
    }

    pub fn line_string(points: &[(f64, f64)]) -> Self {
        Geometry::LineString(points.iter().copied().map(Position::from).collect())
    }

    /// Polygon without holes; the ring is closed if needed
    pub fn simple_polygon(points: &[(f64, f64)]) -> Self {
        let mut ring: Ring = points.iter().copied().map(Position::from).collect();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Geometry::Polygon(PolygonCoordinates::new(ring))
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
            Geometry::Unlocated => GeometryKind::Unlocated,
        }
    }

    #[inline]
    pub fn is_unlocated(&self) -> bool {
        matches!(self, Geometry::Unlocated)
    }

    /// Dispatch to the visitor method matching this geometry's kind
    pub fn accept<V: GeometryVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        match self {
            Geometry::Point(p) => visitor.visit_point(p),
            Geometry::MultiPoint(points) => visitor.visit_multi_point(points),
            Geometry::LineString(line) => visitor.visit_line_string(line),
            Geometry::MultiLineString(lines) => visitor.visit_multi_line_string(lines),
            Geometry::Polygon(polygon) => visitor.visit_polygon(polygon),
            Geometry::MultiPolygon(polygons) => visitor.visit_multi_polygon(polygons),
            Geometry::GeometryCollection(members) => visitor.visit_geometry_collection(members),
            Geometry::Unlocated => visitor.visit_unlocated(),
        }
    }
}

/// Per-kind operation over a [`Geometry`]
pub trait GeometryVisitor {
    type Output;

    fn visit_point(&self, point: &Position) -> Self::Output;
    fn visit_multi_point(&self, points: &[Position]) -> Self::Output;
    fn visit_line_string(&self, line: &[Position]) -> Self::Output;
    fn visit_multi_line_string(&self, lines: &[Vec<Position>]) -> Self::Output;
    fn visit_polygon(&self, polygon: &PolygonCoordinates) -> Self::Output;
    fn visit_multi_polygon(&self, polygons: &[PolygonCoordinates]) -> Self::Output;
    fn visit_geometry_collection(&self, geometries: &[Geometry]) -> Self::Output;
    fn visit_unlocated(&self) -> Self::Output;
}

/// GeoJSON wire form of a located geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: PolygonCoordinates },
    MultiPolygon { coordinates: Vec<PolygonCoordinates> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl From<Option<GeoJsonGeometry>> for Geometry {
    fn from(value: Option<GeoJsonGeometry>) -> Self {
        match value {
            None => Geometry::Unlocated,
            Some(GeoJsonGeometry::Point { coordinates }) => Geometry::Point(coordinates),
            Some(GeoJsonGeometry::MultiPoint { coordinates }) => Geometry::MultiPoint(coordinates),
            Some(GeoJsonGeometry::LineString { coordinates }) => Geometry::LineString(coordinates),
            Some(GeoJsonGeometry::MultiLineString { coordinates }) => {
                Geometry::MultiLineString(coordinates)
            }
            Some(GeoJsonGeometry::Polygon { coordinates }) => Geometry::Polygon(coordinates),
            Some(GeoJsonGeometry::MultiPolygon { coordinates }) => {
                Geometry::MultiPolygon(coordinates)
            }
            Some(GeoJsonGeometry::GeometryCollection { geometries }) => {
                Geometry::GeometryCollection(geometries)
            }
        }
    }
}

impl From<Geometry> for Option<GeoJsonGeometry> {
    fn from(value: Geometry) -> Self {
        Some(match value {
            Geometry::Unlocated => return None,
            Geometry::Point(coordinates) => GeoJsonGeometry::Point { coordinates },
            Geometry::MultiPoint(coordinates) => GeoJsonGeometry::MultiPoint { coordinates },
            Geometry::LineString(coordinates) => GeoJsonGeometry::LineString { coordinates },
            Geometry::MultiLineString(coordinates) => {
                GeoJsonGeometry::MultiLineString { coordinates }
            }
            Geometry::Polygon(coordinates) => GeoJsonGeometry::Polygon { coordinates },
            Geometry::MultiPolygon(coordinates) => GeoJsonGeometry::MultiPolygon { coordinates },
            Geometry::GeometryCollection(geometries) => {
                GeoJsonGeometry::GeometryCollection { geometries }
            }
        })
    }
}
