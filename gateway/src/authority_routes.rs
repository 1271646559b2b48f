//! Authority API Routes
//!
//! Login, geofence management, incident handling and session housekeeping.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::notifications::{Notification, NotificationLevel};
use crate::session::{Session, SessionStats};
use crate::AppState;
use emergency_response::{Incident, IncidentReport};
use geo_primitives::{Coordinate, GeoError};
use geofencing::{Geofence, RiskKind, DEFAULT_CENTER};

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub seeded_geofences: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateGeofenceRequest {
    #[serde(default)]
    pub name: String,
    pub kind: String,
    pub radius_meters: f64,
    /// Falls back to the tourist's location, then the default center
    pub center: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub cancelled_notifications: usize,
}

// ========== Route Handlers ==========

pub async fn authority_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.id.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Please enter credentials".to_string()));
    }

    let config = &state.config;
    if req.id != config.authority_id || req.password != config.authority_password {
        warn!("Authority login failed for {}", req.id);
        state
            .notifier
            .notify(NotificationLevel::Danger, "Invalid credentials")
            .await;
        return Err(ApiError::InvalidCredentials);
    }

    let seeded = {
        let mut session = state.session.write().await;
        session.authority_logged_in = true;
        session.geofences.seed_demo()
    };
    info!("Authority {} logged in", req.id);

    state
        .notifier
        .notify(NotificationLevel::Success, "Authority login successful")
        .await;
    if seeded > 0 {
        state
            .notifier
            .notify(NotificationLevel::Success, "Demo geofences initialized")
            .await;
    }

    Ok(Json(LoginResponse {
        authenticated: true,
        seeded_geofences: seeded,
    }))
}

pub async fn list_geofences(State(state): State<AppState>) -> Json<Vec<Geofence>> {
    Json(state.session.read().await.geofences.as_slice().to_vec())
}

pub async fn create_geofence(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateGeofenceRequest>,
) -> ApiResult<(StatusCode, Json<Geofence>)> {
    let fence = {
        let mut session = state.session.write().await;
        session.require_authority()?;

        let kind: RiskKind = req.kind.parse()?;
        let center = match req.center {
            Some(center) if !center.is_valid() => {
                return Err(GeoError::InvalidCoordinate {
                    latitude: center.latitude,
                    longitude: center.longitude,
                }
                .into())
            }
            Some(center) => center,
            None => session.current_location().unwrap_or(DEFAULT_CENTER),
        };

        let fence = Geofence::new(
            format!("GF-{}", Uuid::new_v4().simple()),
            req.name.trim(),
            kind,
            center,
            req.radius_meters,
        );
        session.geofences.add(fence)?.clone()
    };

    state
        .notifier
        .notify(
            NotificationLevel::Success,
            format!("Geofence \"{}\" created successfully", fence.name),
        )
        .await;
    Ok((StatusCode::CREATED, Json(fence)))
}

pub async fn list_incidents(State(state): State<AppState>) -> Json<Vec<Incident>> {
    Json(state.session.read().await.incidents.all().to_vec())
}

pub async fn resolve_incident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Incident>> {
    let incident = state.session.write().await.incidents.resolve(&id)?.clone();
    state
        .notifier
        .notify(NotificationLevel::Success, "Incident resolved successfully")
        .await;
    Ok(Json(incident))
}

pub async fn incident_report(State(state): State<AppState>) -> ApiResult<Json<IncidentReport>> {
    let report = {
        let session = state.session.read().await;
        if session.incidents.is_empty() {
            return Err(ApiError::NoIncidents);
        }
        session.incidents.report_snapshot(session.geofences.len())
    };
    info!("Incident report generated ({} incidents)", report.total_incidents);

    state
        .notifier
        .notify(NotificationLevel::Success, "Incident report exported successfully")
        .await;
    Ok(Json(report))
}

pub async fn session_stats(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.session.read().await.stats())
}

pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifier.recent().await)
}

/// Discard the whole session and start fresh
pub async fn reset_session(State(state): State<AppState>) -> Json<ResetResponse> {
    let cancelled = {
        // SOS handlers stage notices under the session lock, so none can slip in
        let mut session = state.session.write().await;
        let cancelled = state.notifier.cancel_pending().await;
        *session = Session::new();
        state.notifier.clear().await;
        cancelled
    };
    info!("Session reset");

    state
        .notifier
        .notify(NotificationLevel::Success, "All data cleared successfully")
        .await;
    Json(ResetResponse {
        cancelled_notifications: cancelled,
    })
}
