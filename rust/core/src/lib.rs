// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Geoseam Core
//!
//! Geometry model shared by the geoseam crates.
//!
//! ## Overview
//!
//! - **Positions and geometries**: a closed [`Geometry`] sum type with visitor
//!   dispatch and GeoJSON serialization through [serde](https://docs.rs/serde)
//! - **Reference systems**: the [`Crs`] set and its WKT definitions, read with a
//!   [nom](https://docs.rs/nom) parser into an [`Ellipsoid`]
//! - **Criteria**: the search predicate tree inspected by spatial helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use geoseam_core::{Crs, Ellipsoid, Geometry, GeometryKind};
//!
//! let polygon = Geometry::simple_polygon(&[(170.0, 10.0), (-170.0, 10.0), (-170.0, 20.0)]);
//! assert_eq!(polygon.kind(), GeometryKind::Polygon);
//!
//! let mars = Ellipsoid::from_wkt(Crs::Mars49900.wkt()).unwrap();
//! assert_eq!(mars.semi_major_axis, 3_396_190.0);
//! ```

pub mod criterion;
pub mod crs;
pub mod error;
pub mod geometry;
pub mod position;
pub mod wkt;

pub use criterion::{
    contains_circle_criterion, contains_polygon_or_bbox_criterion, find_circle_criterion,
    find_polygon_criterion, BoundaryBoxCriterion, CircleCriterion, ComparisonOperator, Criterion,
    CriterionKind, DateRangeCriterion, PolygonCriterion, RangeCriterion, ValueComparison,
};
pub use crs::{Crs, Ellipsoid, AUTHALIC_SPHERE_RADIUS};
pub use error::{Error, Result};
pub use geometry::{
    GeoJsonGeometry, Geometry, GeometryKind, GeometryVisitor, PolygonCoordinates, Ring,
};
pub use position::{Position, NORTH_POLE_LATITUDE};
pub use wkt::{parse_wkt, WktNode, WktValue};
