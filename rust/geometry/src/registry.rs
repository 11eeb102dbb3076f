// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CRS registry
//!
//! Holds one [`GeodeticCalculator`] per reference system and the full pairwise
//! transform table. A registry is immutable once built; the process-wide
//! instance from [`CrsRegistry::global`] is initialized exactly once.

use crate::error::{Error, Result};
use crate::geodesic::GeodeticCalculator;
use geoseam_core::{Crs, Ellipsoid, Position};
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Rings at least this long are transformed in parallel
const PARALLEL_THRESHOLD: usize = 4096;

/// Latitude mapping between two geographic reference systems.
///
/// Longitudes are kept. A latitude is carried along its geocentric ray:
/// `tan φ_target = ((1 - f_source) / (1 - f_target))² · tan φ_source`,
/// which maps equator to equator and pole to pole and is exactly invertible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub source: Crs,
    pub target: Crs,
    source_factor: f64,
    target_factor: f64,
}

impl CoordinateTransform {
    pub fn between(
        source: Crs,
        source_ellipsoid: &Ellipsoid,
        target: Crs,
        target_ellipsoid: &Ellipsoid,
    ) -> Self {
        Self {
            source,
            target,
            source_factor: (1.0 - source_ellipsoid.flattening()).powi(2),
            target_factor: (1.0 - target_ellipsoid.flattening()).powi(2),
        }
    }

    pub fn identity(crs: Crs) -> Self {
        Self {
            source: crs,
            target: crs,
            source_factor: 1.0,
            target_factor: 1.0,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.source_factor == self.target_factor
    }

    /// Transform in the opposite direction
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            source_factor: self.target_factor,
            target_factor: self.source_factor,
        }
    }

    pub fn apply(&self, position: Position) -> Position {
        if self.is_identity() {
            return position;
        }
        let (sin_lat, cos_lat) = position.latitude.to_radians().sin_cos();
        let latitude = (self.source_factor * sin_lat)
            .atan2(self.target_factor * cos_lat)
            .to_degrees();
        position.with_latitude(latitude)
    }

    /// Transform a coordinate array, in parallel when it is long
    pub fn apply_all(&self, positions: &[Position]) -> Vec<Position> {
        if self.is_identity() {
            return positions.to_vec();
        }

        #[cfg(not(target_arch = "wasm32"))]
        if positions.len() >= PARALLEL_THRESHOLD {
            return positions.par_iter().map(|p| self.apply(*p)).collect();
        }

        positions.iter().map(|p| self.apply(*p)).collect()
    }
}

/// Registry of geodetic calculators and transforms
#[derive(Debug, Clone)]
pub struct CrsRegistry {
    calculators: FxHashMap<Crs, GeodeticCalculator>,
    transforms: FxHashMap<(Crs, Crs), CoordinateTransform>,
}

impl CrsRegistry {
    /// Build a registry from the built-in definitions of every [`Crs`]
    pub fn new() -> Result<Self> {
        Self::from_definitions(Crs::all().into_iter().map(|crs| (crs, crs.wkt())))
    }

    /// Build a registry from custom WKT definitions.
    ///
    /// Transforms are registered between every pair of the given systems;
    /// systems left out have neither a calculator nor transforms.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = (Crs, &'a str)>,
    ) -> Result<Self> {
        let mut ellipsoids: Vec<(Crs, Ellipsoid)> = Vec::new();
        for (crs, wkt) in definitions {
            let ellipsoid = Ellipsoid::from_wkt(wkt).map_err(|e| Error::Projection {
                crs,
                reason: e.to_string(),
            })?;
            ellipsoids.push((crs, ellipsoid));
        }

        let mut transforms = FxHashMap::default();
        for (source, source_ellipsoid) in &ellipsoids {
            for (target, target_ellipsoid) in &ellipsoids {
                if source != target {
                    transforms.insert(
                        (*source, *target),
                        CoordinateTransform::between(
                            *source,
                            source_ellipsoid,
                            *target,
                            target_ellipsoid,
                        ),
                    );
                }
            }
        }

        let calculators: FxHashMap<Crs, GeodeticCalculator> = ellipsoids
            .into_iter()
            .map(|(crs, ellipsoid)| (crs, GeodeticCalculator::new(ellipsoid)))
            .collect();

        debug!(
            "Built CRS registry: {} calculators, {} transforms",
            calculators.len(),
            transforms.len()
        );
        Ok(Self {
            calculators,
            transforms,
        })
    }

    /// Process-wide registry built from the built-in definitions.
    ///
    /// # Panics
    /// If a built-in definition is malformed. This can only happen through a
    /// broken build and must stop the process at startup.
    pub fn global() -> &'static CrsRegistry {
        static REGISTRY: OnceLock<CrsRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| match CrsRegistry::new() {
            Ok(registry) => registry,
            Err(e) => panic!("built-in CRS definitions are invalid: {}", e),
        })
    }

    pub fn calculator(&self, crs: Crs) -> Result<&GeodeticCalculator> {
        self.calculators.get(&crs).ok_or(Error::UnsupportedCrs(crs))
    }

    /// Transform from `from` to `to`; identity when both are the same
    pub fn coordinate_transform(&self, from: Crs, to: Crs) -> Result<CoordinateTransform> {
        if from == to {
            return Ok(CoordinateTransform::identity(from));
        }
        self.transforms
            .get(&(from, to))
            .copied()
            .ok_or(Error::Transform { from, to })
    }

    /// Geodesic distance in meters
    pub fn distance(&self, from: Position, to: Position, crs: Crs) -> Result<f64> {
        Ok(self.calculator(crs)?.distance(from, to))
    }

    /// Position at `distance` meters from `origin` along `bearing` degrees
    pub fn destination(
        &self,
        origin: Position,
        bearing: f64,
        distance: f64,
        crs: Crs,
    ) -> Result<Position> {
        Ok(self.calculator(crs)?.destination(origin, bearing, distance))
    }

    pub fn transform_point(&self, point: Position, from: Crs, to: Crs) -> Result<Position> {
        Ok(self.coordinate_transform(from, to)?.apply(point))
    }

    pub fn transform_ring(&self, ring: &[Position], from: Crs, to: Crs) -> Result<Vec<Position>> {
        Ok(self.coordinate_transform(from, to)?.apply_all(ring))
    }
}

/// Geodesic distance in meters with the process-wide registry
pub fn distance(from: Position, to: Position, crs: Crs) -> Result<f64> {
    CrsRegistry::global().distance(from, to, crs)
}

/// Destination point with the process-wide registry
pub fn destination(origin: Position, bearing: f64, distance: f64, crs: Crs) -> Result<Position> {
    CrsRegistry::global().destination(origin, bearing, distance, crs)
}

/// Distance on Earth (WGS 84), in meters
pub fn distance_on_earth(from: Position, to: Position) -> Result<f64> {
    CrsRegistry::global().distance(from, to, Crs::Wgs84)
}

/// Distance on Mars (IAU 49900), in meters
pub fn distance_on_mars(from: Position, to: Position) -> Result<f64> {
    CrsRegistry::global().distance(from, to, Crs::Mars49900)
}

pub fn destination_on_earth(origin: Position, bearing: f64, distance: f64) -> Result<Position> {
    CrsRegistry::global().destination(origin, bearing, distance, Crs::Wgs84)
}

pub fn destination_on_mars(origin: Position, bearing: f64, distance: f64) -> Result<Position> {
    CrsRegistry::global().destination(origin, bearing, distance, Crs::Mars49900)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = CrsRegistry::new().unwrap();
        for from in Crs::all() {
            assert!(registry.calculator(from).is_ok());
            for to in Crs::all() {
                assert!(registry.coordinate_transform(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_same_crs_is_identity() {
        let registry = CrsRegistry::global();
        let p = Position::new(12.25, -33.5);
        assert_eq!(registry.transform_point(p, Crs::Mars49900, Crs::Mars49900).unwrap(), p);
    }

    #[test]
    fn test_transform_keeps_longitude_and_fixed_latitudes() {
        let registry = CrsRegistry::global();
        let equator = registry
            .transform_point(Position::new(60.0, 0.0), Crs::Mars49900, Crs::Wgs84)
            .unwrap();
        assert_eq!(equator, Position::new(60.0, 0.0));

        let mid = registry
            .transform_point(Position::new(60.0, 60.0), Crs::Mars49900, Crs::Wgs84)
            .unwrap();
        assert_eq!(mid.longitude, 60.0);
        // Mars is flatter than Earth: latitudes move toward the equator
        assert!(mid.latitude < 60.0 && mid.latitude > 59.5);

        let pole = registry
            .transform_point(Position::new(0.0, 90.0), Crs::Mars49900, Crs::Wgs84)
            .unwrap();
        assert_abs_diff_eq!(pole.latitude, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_roundtrip() {
        let registry = CrsRegistry::global();
        for from in Crs::all() {
            for to in Crs::all() {
                for lat in [-89.5, -45.0, -10.0, 0.0, 33.3, 71.0, 90.0] {
                    let p = Position::new(-120.0, lat);
                    let there = registry.transform_point(p, from, to).unwrap();
                    let back = registry.transform_point(there, to, from).unwrap();
                    assert_abs_diff_eq!(back.latitude, lat, epsilon = 1e-9);
                    assert_eq!(back.longitude, p.longitude);
                }
            }
        }
    }

    #[test]
    fn test_large_ring_parallel_matches_sequential() {
        let registry = CrsRegistry::global();
        let ring: Vec<Position> = (0..PARALLEL_THRESHOLD + 10)
            .map(|i| Position::new(i as f64 * 0.01, (i % 170) as f64 - 85.0))
            .collect();
        let transformed = registry.transform_ring(&ring, Crs::Wgs84, Crs::Astro).unwrap();
        assert_eq!(transformed.len(), ring.len());
        let t = registry.coordinate_transform(Crs::Wgs84, Crs::Astro).unwrap();
        for (p, q) in ring.iter().zip(&transformed) {
            assert_eq!(t.apply(*p), *q);
        }
    }

    #[test]
    fn test_partial_registry_errors() {
        let registry = CrsRegistry::from_definitions([(Crs::Wgs84, Crs::Wgs84.wkt())]).unwrap();
        assert_eq!(
            registry.transform_point(Position::default(), Crs::Wgs84, Crs::Astro),
            Err(Error::Transform {
                from: Crs::Wgs84,
                to: Crs::Astro
            })
        );
        assert_eq!(
            registry.distance(Position::default(), Position::new(1.0, 1.0), Crs::Mars49900),
            Err(Error::UnsupportedCrs(Crs::Mars49900))
        );
    }

    #[test]
    fn test_malformed_definition() {
        let result = CrsRegistry::from_definitions([(Crs::Astro, "GEOGCS[\"broken\"")]);
        assert!(matches!(result, Err(Error::Projection { crs: Crs::Astro, .. })));
    }

    #[test]
    fn test_convenience_functions() {
        let d = distance_on_mars(Position::new(0.0, 90.0), Position::new(0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(d, 5_319_034.253_283_859, epsilon = 1.0);
        let e = distance_on_earth(Position::new(0.0, 0.0), Position::new(0.0, 1.0)).unwrap();
        assert!(e > 110_000.0 && e < 112_000.0);

        let north = destination_on_mars(Position::new(45.0, 45.0), 0.0, 50_000.0).unwrap();
        let north_earth = destination_on_earth(Position::new(45.0, 45.0), 0.0, 50_000.0).unwrap();
        assert!(north.latitude > north_earth.latitude);
    }
}
