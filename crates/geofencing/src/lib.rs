//! Geofencing Library
//!
//! Circular risk zones drawn by the authority and the evaluator that reports
//! the highest-risk zone containing a tourist's position.
//!
//! # Risk Table
//!
//! | Kind       | Level | Colour  |
//! |------------|-------|---------|
//! | safe       | 1     | #27ae60 |
//! | warning    | 5     | #f39c12 |
//! | danger     | 8     | #e74c3c |
//! | restricted | 10    | #8e44ad |
//!
//! A point outside every fence is assessed as `safe` at level 0, which is
//! deliberately different from standing inside a `safe` fence (level 1).

use chrono::{DateTime, Utc};
use geo_primitives::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod assess;
pub mod registry;

pub use assess::assess;
pub use registry::{demo_fences, GeofenceRegistry, DEFAULT_CENTER};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeofenceError {
    #[error("Geofence already exists: {0}")]
    DuplicateId(String),
    #[error("Geofence name is required")]
    MissingName,
    #[error("Invalid radius for geofence {id}: {radius}")]
    InvalidRadius { id: String, radius: f64 },
    #[error("Unknown risk kind: {0}")]
    UnknownKind(String),
}

pub type Result<T> = std::result::Result<T, GeofenceError>;

/// Zone classification, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskKind {
    Safe,
    Warning,
    Danger,
    Restricted,
}

impl RiskKind {
    pub const ALL: [RiskKind; 4] = [
        RiskKind::Safe,
        RiskKind::Warning,
        RiskKind::Danger,
        RiskKind::Restricted,
    ];

    /// Fixed risk level for this kind
    pub const fn level(&self) -> u8 {
        match self {
            Self::Safe => 1,
            Self::Warning => 5,
            Self::Danger => 8,
            Self::Restricted => 10,
        }
    }

    /// Map display colour
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Safe => "#27ae60",
            Self::Warning => "#f39c12",
            Self::Danger => "#e74c3c",
            Self::Restricted => "#8e44ad",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Restricted => "restricted",
        }
    }

    /// Kinds that should raise an alert for the tourist
    pub fn is_alerting(&self) -> bool {
        matches!(self, Self::Danger | Self::Restricted)
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskKind {
    type Err = GeofenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "warning" => Ok(Self::Warning),
            "danger" => Ok(Self::Danger),
            "restricted" => Ok(Self::Restricted),
            _ => Err(GeofenceError::UnknownKind(s.to_string())),
        }
    }
}

/// A named circular zone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub kind: RiskKind,
    pub center: Coordinate,
    pub radius_meters: f64,
    pub created_at: DateTime<Utc>,
}

impl Geofence {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: RiskKind,
        center: Coordinate,
        radius_meters: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            center,
            radius_meters,
            created_at: Utc::now(),
        }
    }

    /// Inclusive containment; a negative radius contains nothing
    pub fn contains(&self, point: Coordinate) -> bool {
        geo_primitives::distance_meters(point, self.center) <= self.radius_meters
    }
}

/// Result of evaluating a point against a set of fences
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyAssessment {
    pub kind: RiskKind,
    pub level: u8,
}

impl SafetyAssessment {
    /// Assessment for a point outside every fence
    pub const OUTSIDE: SafetyAssessment = SafetyAssessment {
        kind: RiskKind::Safe,
        level: 0,
    };

    pub fn is_alerting(&self) -> bool {
        self.kind.is_alerting()
    }
}

impl Default for SafetyAssessment {
    fn default() -> Self {
        Self::OUTSIDE
    }
}
