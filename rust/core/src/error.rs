// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the geometry model.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading the geometry model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed WKT text
    #[error("WKT error: {0}")]
    Wkt(String),

    /// Geometry or criterion input that cannot be interpreted
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
