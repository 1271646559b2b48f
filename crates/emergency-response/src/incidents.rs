//! Incident log and exportable report

use crate::{
    Incident, IncidentKind, IncidentStatus, ResponseError, Result, Severity,
};
use chrono::{DateTime, Utc};
use geo_primitives::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct IncidentLog {
    incidents: Vec<Incident>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self {
            incidents: Vec::new(),
        }
    }

    /// Record a new active emergency
    pub fn report(
        &mut self,
        tourist_id: &str,
        location: Coordinate,
        severity: Severity,
    ) -> &Incident {
        let incident = Incident {
            id: format!("INC-{}", Uuid::new_v4().simple()),
            tourist_id: tourist_id.to_string(),
            kind: IncidentKind::Emergency,
            location,
            severity,
            status: IncidentStatus::Active,
            reported_at: Utc::now(),
        };

        info!(
            "Incident {} reported by {} ({:?}) at {:.6}, {:.6}",
            incident.id, tourist_id, severity, location.latitude, location.longitude
        );

        self.incidents.push(incident);
        &self.incidents[self.incidents.len() - 1]
    }

    pub fn resolve(&mut self, id: &str) -> Result<&Incident> {
        let incident = self
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ResponseError::IncidentNotFound(id.to_string()))?;

        incident.status = IncidentStatus::Resolved;
        info!("Incident {} resolved", id);
        Ok(&*incident)
    }

    pub fn get(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    pub fn all(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.count_status(IncidentStatus::Active)
    }

    pub fn resolved_count(&self) -> usize {
        self.count_status(IncidentStatus::Resolved)
    }

    pub fn emergency_count(&self) -> usize {
        self.incidents
            .iter()
            .filter(|i| i.kind == IncidentKind::Emergency)
            .count()
    }

    fn count_status(&self, status: IncidentStatus) -> usize {
        self.incidents.iter().filter(|i| i.status == status).count()
    }

    /// Point-in-time export of the log
    pub fn report_snapshot(&self, geofence_count: usize) -> IncidentReport {
        IncidentReport {
            generated_at: Utc::now(),
            total_incidents: self.incidents.len(),
            incidents: self.incidents.clone(),
            geofences: geofence_count,
            summary: ReportSummary {
                emergency_count: self.emergency_count(),
                resolved_count: self.resolved_count(),
                active_count: self.active_count(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentReport {
    pub generated_at: DateTime<Utc>,
    pub total_incidents: usize,
    pub incidents: Vec<Incident>,
    pub geofences: usize,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub emergency_count: usize,
    pub resolved_count: usize,
    pub active_count: usize,
}
