//! Emergency Response Library
//!
//! Ranks response teams by great-circle distance to an incident, estimates
//! arrival at a constant city speed and takes every dispatched team out of
//! service for the rest of the session.
//!
//! # ETA Model
//!
//! ```text
//! eta_minutes = max(2, round(distance_m / 1000 / 40 · 60))
//! ```

use chrono::{DateTime, Utc};
use geo_primitives::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod incidents;
pub mod planner;

pub use incidents::{IncidentLog, IncidentReport, ReportSummary};
pub use planner::{dispatch, eta_minutes, ResponseRoster};

/// Average travel speed in city traffic (km/h)
pub const AVERAGE_SPEED_KMH: f64 = 40.0;

/// No team is ever reported closer than this
pub const MIN_ETA_MINUTES: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("Incident not found: {0}")]
    IncidentNotFound(String),
    #[error("Response team already exists: {0}")]
    DuplicateTeam(String),
    #[error("Unknown team kind: {0}")]
    UnknownTeamKind(String),
}

pub type Result<T> = std::result::Result<T, ResponseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamKind {
    Police,
    Ambulance,
    Fire,
}

impl TeamKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Police => "police",
            Self::Ambulance => "ambulance",
            Self::Fire => "fire",
        }
    }

    /// Human readable unit name
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Police => "Police",
            Self::Ambulance => "Ambulance",
            Self::Fire => "Fire Department",
        }
    }
}

impl fmt::Display for TeamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TeamKind {
    type Err = ResponseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "police" => Ok(Self::Police),
            "ambulance" | "medical" => Ok(Self::Ambulance),
            "fire" | "fire department" => Ok(Self::Fire),
            _ => Err(ResponseError::UnknownTeamKind(s.to_string())),
        }
    }
}

/// A response unit and where it is stationed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseTeam {
    pub id: String,
    pub kind: TeamKind,
    pub base: Coordinate,
    pub available: bool,
}

impl ResponseTeam {
    pub fn new(id: impl Into<String>, kind: TeamKind, base: Coordinate) -> Self {
        Self {
            id: id.into(),
            kind,
            base,
            available: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: String,
    pub tourist_id: String,
    pub kind: IncidentKind,
    pub location: Coordinate,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Dispatched,
}

/// One team assigned to an incident
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchRecord {
    pub team_id: String,
    pub team_kind: TeamKind,
    pub eta_minutes: u32,
    pub status: DispatchStatus,
}
