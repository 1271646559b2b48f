//! Session State
//!
//! Everything a single operator session knows: the registered tourist, their
//! last fix, the authority's fences, the response roster, incidents and the
//! identity ledger. Ambient risk factors are sampled once when the session
//! starts. One value per process, replaced wholesale on reset.

use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use digital_identity::IdentityLedger;
use emergency_response::{IncidentLog, ResponseRoster};
use geo_primitives::Coordinate;
use geofencing::{GeofenceRegistry, SafetyAssessment};
use risk_analysis::RiskFactors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tourist {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub nationality: String,
    pub digital_id: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub simulated: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionStats {
    pub active_tourists: usize,
    pub total_incidents: usize,
    pub active_incidents: usize,
    pub geofences: usize,
    pub available_teams: usize,
}

#[derive(Debug)]
pub struct Session {
    pub tourist: Option<Tourist>,
    pub location: Option<LocationFix>,
    pub last_assessment: Option<SafetyAssessment>,
    pub geofences: GeofenceRegistry,
    pub roster: ResponseRoster,
    pub incidents: IncidentLog,
    pub identity: IdentityLedger,
    pub authority_logged_in: bool,
    /// Crowd, weather and hour as of session start
    pub risk_factors: RiskFactors,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            tourist: None,
            location: None,
            last_assessment: None,
            geofences: GeofenceRegistry::new(),
            roster: ResponseRoster::default_roster(),
            incidents: IncidentLog::new(),
            identity: IdentityLedger::new(),
            authority_logged_in: false,
            risk_factors: RiskFactors::sample(Local::now().hour(), &mut rand::thread_rng()),
        }
    }

    /// Register the session's tourist, replacing any previous one.
    /// The current fix is kept.
    pub fn register(&mut self, tourist: Tourist) -> &Tourist {
        info!("Tourist {} registered ({})", tourist.id, tourist.nationality);
        self.tourist.insert(tourist)
    }

    pub fn tourist(&self) -> ApiResult<&Tourist> {
        self.tourist.as_ref().ok_or(ApiError::NotRegistered)
    }

    pub fn require_authority(&self) -> ApiResult<()> {
        if self.authority_logged_in {
            Ok(())
        } else {
            Err(ApiError::NotAuthority)
        }
    }

    pub fn current_location(&self) -> ApiResult<Coordinate> {
        self.location
            .map(|fix| fix.coordinate)
            .ok_or(ApiError::NoLocation)
    }

    /// Tourist and location, as needed to raise an SOS
    pub fn sos_context(&self) -> ApiResult<(String, Coordinate)> {
        let tourist_id = self.tourist()?.id.clone();
        let location = self.current_location()?;
        Ok((tourist_id, location))
    }

    /// Store a new fix and assess it against the current fences
    pub fn update_location(
        &mut self,
        coordinate: Coordinate,
        simulated: bool,
    ) -> ApiResult<SafetyAssessment> {
        self.tourist()?;
        let fix = LocationFix {
            coordinate,
            simulated,
            recorded_at: Utc::now(),
        };
        self.location = Some(fix);

        let assessment = self.geofences.assess(coordinate);
        self.last_assessment = Some(assessment);
        info!(
            "Location {:.6}, {:.6}{} assessed as {} ({}/10)",
            coordinate.latitude,
            coordinate.longitude,
            if simulated { " (simulated)" } else { "" },
            assessment.kind,
            assessment.level
        );
        Ok(assessment)
    }

    /// Nudge the current fix, if any, and re-assess it
    pub fn drift(&mut self, dlat: f64, dlng: f64) -> Option<SafetyAssessment> {
        self.tourist.as_ref()?;
        let fix = self.location.as_mut()?;

        let moved = fix.coordinate.offset(dlat, dlng);
        if !moved.is_valid() {
            debug!("Drift would leave valid range, skipping");
            return None;
        }
        fix.coordinate = moved;
        fix.recorded_at = Utc::now();

        let assessment = self.geofences.assess(moved);
        self.last_assessment = Some(assessment);
        debug!(
            "Drifted to {:.6}, {:.6}: {} ({}/10)",
            moved.latitude, moved.longitude, assessment.kind, assessment.level
        );
        Some(assessment)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active_tourists: usize::from(self.tourist.is_some()),
            total_incidents: self.incidents.len(),
            active_incidents: self.incidents.active_count(),
            geofences: self.geofences.len(),
            available_teams: self.roster.available_count(),
        }
    }
}
