// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use geoseam_core::Crs;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during normalization, transformation and measurement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed CRS definition; fatal when building a registry
    #[error("Projection error for {crs}: {reason}")]
    Projection { crs: Crs, reason: String },

    /// No transform between two reference systems
    #[error("No transform from {from} to {to}")]
    Transform { from: Crs, to: Crs },

    /// No geodetic calculator for a reference system
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(Crs),

    /// Ring cannot be turned into simple polygon rings
    #[error("Ring repair failed: {0}")]
    RingRepair(String),

    #[error("Core error: {0}")]
    Core(#[from] geoseam_core::Error),
}
