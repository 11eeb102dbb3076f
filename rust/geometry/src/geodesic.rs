// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geodetic calculator
//!
//! Karney's geodesic algorithms on an ellipsoid of revolution, converging for
//! every pair of points including nearly antipodal ones, with closed
//! great-circle formulas when the ellipsoid is a sphere.

use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};
use geoseam_core::{Ellipsoid, Position};

/// Distance and bearing computations on one reference ellipsoid
#[derive(Debug, Clone, PartialEq)]
pub struct GeodeticCalculator {
    ellipsoid: Ellipsoid,
}

impl GeodeticCalculator {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn geodesic(&self) -> Geodesic {
        Geodesic::new(self.ellipsoid.semi_major_axis, self.ellipsoid.flattening())
    }

    /// Geodesic distance between two positions, in meters
    pub fn distance(&self, from: Position, to: Position) -> f64 {
        if from == to {
            return 0.0;
        }
        if self.ellipsoid.is_sphere() {
            return self.ellipsoid.semi_major_axis * central_angle(from, to);
        }
        self.geodesic().inverse(from.latitude, from.longitude, to.latitude, to.longitude)
    }

    /// Position reached from `origin` after `distance` meters along the
    /// initial bearing `bearing` (degrees clockwise from north).
    /// The returned longitude lies in [-180, 180].
    pub fn destination(&self, origin: Position, bearing: f64, distance: f64) -> Position {
        let (lon, lat) = if self.ellipsoid.is_sphere() {
            self.great_circle_direct(origin, bearing, distance)
        } else {
            let (lat, lon): (f64, f64) = self.geodesic().direct(
                origin.latitude,
                origin.longitude,
                bearing,
                distance,
            );
            (lon, lat)
        };
        Position::new(normalize_longitude(lon), lat)
    }

    fn great_circle_direct(&self, origin: Position, bearing: f64, distance: f64) -> (f64, f64) {
        let delta = distance / self.ellipsoid.semi_major_axis;
        let (sin_lat1, cos_lat1) = origin.latitude.to_radians().sin_cos();
        let (sin_brg, cos_brg) = bearing.to_radians().sin_cos();
        let (sin_d, cos_d) = delta.sin_cos();

        let lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * cos_brg).asin();
        let dlon = (sin_brg * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * lat2.sin());
        (origin.longitude + dlon.to_degrees(), lat2.to_degrees())
    }
}

/// Central angle between two positions on the unit sphere (haversine)
pub fn central_angle(from: Position, to: Position) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Wrap a longitude into [-180, 180]
pub fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}
