// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalization configuration, optionally loaded from environment variables.

/// Environment variable for [`NormalizationConfig::manage_poles`]
pub const MANAGE_POLES_ENV: &str = "GEOSEAM_MANAGE_POLES";
/// Environment variable for [`NormalizationConfig::check_polygon_orientation`]
pub const CHECK_POLYGON_ORIENTATION_ENV: &str = "GEOSEAM_CHECK_POLYGON_ORIENTATION";

/// Normalization configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationConfig {
    /// Detect enclosed poles and add polar caps to polygon rings.
    pub manage_poles: bool,
    /// Reverse clockwise rings that would otherwise enclose both poles,
    /// and emit every exterior ring counter-clockwise.
    pub check_polygon_orientation: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            manage_poles: true,
            check_polygon_orientation: false,
        }
    }
}

impl NormalizationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            manage_poles: lookup(MANAGE_POLES_ENV)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.manage_poles),
            check_polygon_orientation: lookup(CHECK_POLYGON_ORIENTATION_ENV)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.check_polygon_orientation),
        }
    }

    pub fn with_manage_poles(mut self, manage_poles: bool) -> Self {
        self.manage_poles = manage_poles;
        self
    }

    pub fn with_check_polygon_orientation(mut self, check: bool) -> Self {
        self.check_polygon_orientation = check;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
