// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate reference systems
//!
//! The supported reference systems form a closed set. Each one carries a
//! WKT `GEOGCS` definition from which its [`Ellipsoid`] is read.

use crate::error::{Error, Result};
use crate::wkt::parse_wkt;
use std::fmt;
use std::str::FromStr;

/// Radius of the sphere with the same surface as the WGS 84 ellipsoid, in meters
pub const AUTHALIC_SPHERE_RADIUS: f64 = 6_371_007.0;

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",
    DATUM["WGS_1984",
        SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],
        AUTHORITY["EPSG","6326"]],
    PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],
    UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],
    AXIS["Geodetic longitude",EAST],
    AXIS["Geodetic latitude",NORTH],
    AUTHORITY["EPSG","4326"]]"#;

const MARS_49900_WKT: &str = r#"GEOGCS["Mars 2000",
    DATUM["D_Mars_2000",
        SPHEROID["Mars_2000_IAU_IAG",3396190.0,169.89444722361179]],
    PRIMEM["Greenwich",0],
    UNIT["Decimal_Degree",0.0174532925199433],
    AXIS["Planetocentric longitude",EAST],
    AXIS["Planetocentric latitude",NORTH],
    AUTHORITY["IAU","49900"]]"#;

const ASTRO_WKT: &str = r#"GEOGCS["ASTRO",
    DATUM["Authalic_Sphere",
        SPHEROID["Authalic_Sphere",6371007.0,0.0]],
    PRIMEM["Greenwich",0],
    UNIT["degree",0.0174532925199433],
    AXIS["Right ascension",EAST],
    AXIS["Declination",NORTH]]"#;

/// Supported reference systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Crs {
    /// Earth, WGS 84 ellipsoid
    #[default]
    Wgs84,
    /// Mars 2000 (IAU 49900) ellipsoid
    Mars49900,
    /// Celestial sphere, modeled as the Earth authalic sphere
    Astro,
}

impl Crs {
    /// Every supported reference system
    pub const fn all() -> [Crs; 3] {
        [Crs::Wgs84, Crs::Mars49900, Crs::Astro]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Crs::Wgs84 => "WGS_84",
            Crs::Mars49900 => "MARS_49900",
            Crs::Astro => "ASTRO",
        }
    }

    /// Built-in WKT definition
    pub fn wkt(&self) -> &'static str {
        match self {
            Crs::Wgs84 => WGS84_WKT,
            Crs::Mars49900 => MARS_49900_WKT,
            Crs::Astro => ASTRO_WKT,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Crs::all()
            .into_iter()
            .find(|crs| crs.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidGeometry(format!("unknown CRS '{}'", s)))
    }
}

/// Reference ellipsoid (or sphere, when the inverse flattening is 0)
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    pub name: String,
    /// Equatorial radius in meters
    pub semi_major_axis: f64,
    /// 1/f; 0 for a sphere
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// Build an ellipsoid, validating its parameters
    pub fn new(
        name: impl Into<String>,
        semi_major_axis: f64,
        inverse_flattening: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !semi_major_axis.is_finite() || semi_major_axis <= 0.0 {
            return Err(Error::Wkt(format!(
                "ellipsoid '{}': semi-major axis must be positive, got {}",
                name, semi_major_axis
            )));
        }
        if !inverse_flattening.is_finite()
            || (inverse_flattening != 0.0 && inverse_flattening <= 1.0)
        {
            return Err(Error::Wkt(format!(
                "ellipsoid '{}': inverse flattening must be 0 or greater than 1, got {}",
                name, inverse_flattening
            )));
        }
        Ok(Self {
            name,
            semi_major_axis,
            inverse_flattening,
        })
    }

    /// Sphere of the given radius
    pub fn sphere(name: impl Into<String>, radius: f64) -> Result<Self> {
        Self::new(name, radius, 0.0)
    }

    /// Read the first `SPHEROID` (or `ELLIPSOID`) node of a WKT definition
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let root = parse_wkt(wkt)?;
        let node = root
            .find("SPHEROID")
            .or_else(|| root.find("ELLIPSOID"))
            .ok_or_else(|| Error::Wkt("no SPHEROID or ELLIPSOID node".to_string()))?;

        let numbers = node.numbers();
        match numbers.as_slice() {
            [a, inv_f, ..] => Self::new(node.name().unwrap_or(""), *a, *inv_f),
            _ => Err(Error::Wkt(format!(
                "{} node needs a semi-major axis and an inverse flattening",
                node.keyword
            ))),
        }
    }

    #[inline]
    pub fn is_sphere(&self) -> bool {
        self.inverse_flattening == 0.0
    }

    #[inline]
    pub fn flattening(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            1.0 / self.inverse_flattening
        }
    }

    /// Polar radius in meters
    #[inline]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening())
    }

    /// Length of a quarter meridian (equator to pole), in meters
    pub fn quarter_meridian(&self) -> f64 {
        let a = self.semi_major_axis;
        let b = self.semi_minor_axis();
        let n = (a - b) / (a + b);
        let n2 = n * n;
        std::f64::consts::FRAC_PI_2 * (a + b) / 2.0 * (1.0 + n2 / 4.0 + n2 * n2 / 64.0)
    }

    /// Radius of the sphere whose meridians have the same length as this ellipsoid's
    pub fn rectifying_radius(&self) -> f64 {
        self.quarter_meridian() / std::f64::consts::FRAC_PI_2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_ellipsoids() {
        let wgs84 = Ellipsoid::from_wkt(Crs::Wgs84.wkt()).unwrap();
        assert_eq!(wgs84.name, "WGS 84");
        assert_eq!(wgs84.semi_major_axis, 6_378_137.0);
        assert_relative_eq!(wgs84.semi_minor_axis(), 6_356_752.314245, epsilon = 1e-6);

        let mars = Ellipsoid::from_wkt(Crs::Mars49900.wkt()).unwrap();
        assert_eq!(mars.semi_major_axis, 3_396_190.0);
        assert!(!mars.is_sphere());

        let astro = Ellipsoid::from_wkt(Crs::Astro.wkt()).unwrap();
        assert!(astro.is_sphere());
        assert_eq!(astro.semi_major_axis, AUTHALIC_SPHERE_RADIUS);
        assert_eq!(astro.semi_minor_axis(), AUTHALIC_SPHERE_RADIUS);
    }

    #[test]
    fn test_quarter_meridian() {
        let wgs84 = Ellipsoid::from_wkt(Crs::Wgs84.wkt()).unwrap();
        assert_relative_eq!(wgs84.quarter_meridian(), 10_001_965.729, epsilon = 0.5);

        let sphere = Ellipsoid::sphere("unit", 1.0).unwrap();
        assert_relative_eq!(sphere.quarter_meridian(), std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_invalid_ellipsoids() {
        assert!(Ellipsoid::from_wkt(r#"GEOGCS["x", DATUM["y"]]"#).is_err());
        assert!(Ellipsoid::from_wkt(r#"SPHEROID["x", -1.0, 298.0]"#).is_err());
        assert!(Ellipsoid::from_wkt(r#"SPHEROID["x", 6378137.0, 0.5]"#).is_err());
        assert!(Ellipsoid::from_wkt(r#"SPHEROID["x", 6378137.0]"#).is_err());
        assert!(Ellipsoid::from_wkt("not wkt at all").is_err());
    }

    #[test]
    fn test_crs_names() {
        for crs in Crs::all() {
            assert_eq!(crs.name().parse::<Crs>().unwrap(), crs);
        }
        assert_eq!("mars_49900".parse::<Crs>().unwrap(), Crs::Mars49900);
        assert!("EPSG:4326".parse::<Crs>().is_err());
        assert_eq!(Crs::Astro.to_string(), "ASTRO");
    }
}
