// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Longitude/latitude positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude of the north pole, in degrees
pub const NORTH_POLE_LATITUDE: f64 = 90.0;

/// A (longitude, latitude) pair in degrees.
///
/// No range restriction applies: unwrapped longitudes such as 190.0 are valid
/// while a geometry is being normalized. Serialized as a GeoJSON position
/// (`[lon, lat]`); a third (altitude) component is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    #[inline]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Same latitude, other longitude
    #[inline]
    pub fn with_longitude(self, longitude: f64) -> Self {
        Self { longitude, ..self }
    }

    /// Same longitude, other latitude
    #[inline]
    pub fn with_latitude(self, latitude: f64) -> Self {
        Self { latitude, ..self }
    }

    /// Exactly on the north or south pole
    #[inline]
    pub fn is_pole(&self) -> bool {
        self.latitude.abs() == NORTH_POLE_LATITUDE
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<[f64; 2]> for Position {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<Position> for [f64; 2] {
    fn from(value: Position) -> Self {
        value.to_array()
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lon, lat] | [lon, lat, _] => Ok(Self::new(*lon, *lat)),
            other => Err(format!(
                "a position needs 2 or 3 numbers, got {}",
                other.len()
            )),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {:?}, {:?} ]", self.longitude, self.latitude)
    }
}
