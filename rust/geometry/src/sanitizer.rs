// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon sanitizer
//!
//! Turns one polygon into a set of hole-free exterior rings that are simple,
//! closed and confined to [-180, 180], capping enclosed poles on the way.

use crate::config::NormalizationConfig;
use crate::error::Result;
use crate::poles::{augment_with_caps, detect_poles, encircles_axis, orient_counter_clockwise};
use crate::rebase::{fold_longitudes, unwrap_longitudes};
use crate::ring_repair::{close_ring, ensure_ccw, repair_ring, split_at_antimeridian};
use geoseam_core::{PolygonCoordinates, Position, Ring};
use tracing::debug;

/// Sanitize a polygon into one or more hole-free polygons.
///
/// Polygons that carry holes are returned unchanged as the only member.
///
/// # Errors
///
/// [`Error::RingRepair`](crate::Error::RingRepair) when the exterior ring has
/// fewer than 3 distinct vertices or has no area left after repair.
pub fn sanitize_polygon(
    polygon: &PolygonCoordinates,
    config: &NormalizationConfig,
) -> Result<Vec<PolygonCoordinates>> {
    if polygon.has_holes() {
        debug!("Polygon with {} holes bypasses cleaning", polygon.holes.len());
        return Ok(vec![polygon.clone()]);
    }

    let rings = sanitize_ring(&polygon.exterior, config)?;
    Ok(rings.into_iter().map(PolygonCoordinates::new).collect())
}

/// Sanitize a single exterior ring
pub fn sanitize_ring(ring: &[Position], config: &NormalizationConfig) -> Result<Vec<Ring>> {
    let mut ring = close_ring(ring);
    if config.check_polygon_orientation {
        ring = orient_counter_clockwise(&ring);
    }

    if config.manage_poles {
        let inclusion = detect_poles(&ring);
        if inclusion.any() {
            ring = augment_with_caps(&ring, inclusion);
        }
    }

    if !ring.iter().any(|p| p.is_pole()) && !encircles_axis(&ring) {
        ring = unwrap_longitudes(&fold_longitudes(&ring));
    }

    let mut sanitized = Vec::new();
    for simple in repair_ring(&ring)? {
        for piece in split_at_antimeridian(&simple) {
            sanitized.push(if config.check_polygon_orientation {
                ensure_ccw(&piece)
            } else {
                piece
            });
        }
    }
    debug!("Sanitized ring into {} rings", sanitized.len());
    Ok(sanitized)
}
