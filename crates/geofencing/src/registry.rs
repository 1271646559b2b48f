//! Append-only geofence collection
//!
//! Insertion order is preserved because the evaluator breaks ties by it.

use crate::{assess, Geofence, GeofenceError, Result, RiskKind, SafetyAssessment};
use geo_primitives::Coordinate;
use tracing::{debug, info};

/// Fallback map center (New Delhi) used when no location is known
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 28.6139,
    longitude: 77.209,
};

#[derive(Debug, Clone, Default)]
pub struct GeofenceRegistry {
    fences: Vec<Geofence>,
}

impl GeofenceRegistry {
    pub fn new() -> Self {
        Self { fences: Vec::new() }
    }

    /// Registry pre-loaded with the demo zones
    pub fn with_demo_fences() -> Self {
        let mut registry = Self::new();
        registry.seed_demo();
        registry
    }

    /// Append a fence after validating it
    pub fn add(&mut self, fence: Geofence) -> Result<&Geofence> {
        if fence.name.trim().is_empty() {
            return Err(GeofenceError::MissingName);
        }
        if !fence.radius_meters.is_finite() || fence.radius_meters <= 0.0 {
            return Err(GeofenceError::InvalidRadius {
                id: fence.id,
                radius: fence.radius_meters,
            });
        }
        if self.contains_id(&fence.id) {
            return Err(GeofenceError::DuplicateId(fence.id));
        }

        info!(
            "Geofence {} \"{}\" ({}, {:.0}m) registered",
            fence.id, fence.name, fence.kind, fence.radius_meters
        );
        self.fences.push(fence);
        Ok(&self.fences[self.fences.len() - 1])
    }

    /// Append any demo fence not already present, returning how many were added
    pub fn seed_demo(&mut self) -> usize {
        let mut added = 0;
        for fence in demo_fences() {
            if self.contains_id(&fence.id) {
                debug!("Demo geofence {} already present", fence.id);
                continue;
            }
            self.fences.push(fence);
            added += 1;
        }
        info!("Seeded {} demo geofences", added);
        added
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.fences.iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Geofence> {
        self.fences.iter().find(|f| f.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Geofence> {
        self.fences.iter()
    }

    pub fn as_slice(&self) -> &[Geofence] {
        &self.fences
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    pub fn assess(&self, point: Coordinate) -> SafetyAssessment {
        assess(point, &self.fences)
    }
}

/// Sample zones around central Delhi
pub fn demo_fences() -> Vec<Geofence> {
    let zones = [
        ("GF-DEMO-1", "India Gate Safe Zone", RiskKind::Safe, 800.0, 28.6129, 77.2295),
        ("GF-DEMO-2", "Red Fort Warning Zone", RiskKind::Warning, 600.0, 28.6562, 77.241),
        ("GF-DEMO-3", "Construction Area", RiskKind::Danger, 400.0, 28.62, 77.21),
    ];

    zones
        .into_iter()
        .map(|(id, name, kind, radius, latitude, longitude)| {
            Geofence::new(id, name, kind, Coordinate { latitude, longitude }, radius)
        })
        .collect()
}
