// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geoseam Geometry Normalization
//!
//! Prepares geometries for search indexes that assume an equirectangular
//! projection: lines and polygons are cut at the antimeridian, enclosed poles
//! get polar caps, and coordinates move between reference systems through a
//! shared [`CrsRegistry`].
//!
//! ```rust
//! use geoseam_geometry::{normalize, Geometry};
//!
//! let line = Geometry::line_string(&[(170.0, 0.0), (-170.0, 0.0)]);
//! let split = normalize(&line).unwrap();
//! assert!(matches!(split, Geometry::MultiLineString(parts) if parts.len() == 2));
//! ```

pub mod config;
pub mod error;
pub mod geodesic;
pub mod line_split;
pub mod normalize;
pub mod poles;
pub mod predicates;
pub mod rebase;
pub mod registry;
pub mod ring_repair;
pub mod sanitizer;
pub mod spherical;

// Re-export the core model for convenience
pub use geoseam_core::{
    Criterion, CriterionKind, Crs, Ellipsoid, Geometry, GeometryKind, GeometryVisitor,
    PolygonCoordinates, Position, Ring,
};

pub use config::NormalizationConfig;
pub use error::{Error, Result};
pub use geodesic::GeodeticCalculator;
pub use line_split::split_line;
pub use normalize::{normalize, transform, transform_with, GeometryNormalizer};
pub use poles::{augment_with_caps, detect_poles, PoleInclusion};
pub use predicates::{
    distance_to_point, distance_to_point_with, is_within_distance, is_within_distance_with,
};
pub use rebase::{normalize_next_coordinate, unwrap_longitudes};
pub use registry::{
    destination, destination_on_earth, destination_on_mars, distance, distance_on_earth,
    distance_on_mars, CoordinateTransform, CrsRegistry,
};
pub use ring_repair::{repair_ring, split_at_antimeridian};
pub use sanitizer::sanitize_polygon;
pub use spherical::{Location, SphericalPolygon};
