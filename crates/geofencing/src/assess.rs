//! Point-in-zone risk evaluation

use crate::{Geofence, SafetyAssessment};
use geo_primitives::Coordinate;
use tracing::debug;

/// Highest-risk fence containing `point`.
///
/// Fences are scanned in slice order and only a strictly higher level
/// replaces the current result, so among equal levels the earliest fence
/// wins.
pub fn assess(point: Coordinate, fences: &[Geofence]) -> SafetyAssessment {
    let mut result = SafetyAssessment::OUTSIDE;

    for fence in fences {
        if !fence.contains(point) {
            continue;
        }

        let level = fence.kind.level();
        if level > result.level {
            debug!("Point inside {} ({}, level {})", fence.id, fence.kind, level);
            result = SafetyAssessment {
                kind: fence.kind,
                level,
            };
        }
    }

    result
}
