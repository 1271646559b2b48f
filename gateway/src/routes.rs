//! Tourist-facing API routes

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::movement::simulated_fix;
use crate::notifications::NotificationLevel;
use crate::session::{LocationFix, Tourist};
use crate::AppState;
use digital_identity::IdentityBlock;
use emergency_response::{DispatchRecord, Incident, ResponseTeam, Severity};
use geo_primitives::Coordinate;
use geofencing::SafetyAssessment;
use risk_analysis::SafetyAnalysis;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct RegisterTouristRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub nationality: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyIdentityRequest {
    #[serde(default)]
    pub digital_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyIdentityResponse {
    pub digital_id: String,
    pub valid: bool,
}

/// Omit both fields to use a simulated fix
#[derive(Debug, Default, Deserialize)]
pub struct LocationRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: LocationFix,
    pub assessment: SafetyAssessment,
}

#[derive(Debug, Deserialize)]
pub struct PointRequest {
    pub lat: f64,
    pub lng: f64,
}

impl PointRequest {
    fn coordinate(&self) -> ApiResult<Coordinate> {
        Ok(Coordinate::new(self.lat, self.lng)?)
    }
}

#[derive(Debug, Serialize)]
pub struct EnhancedSosResponse {
    pub incident: Incident,
    pub dispatched: Vec<DispatchRecord>,
}

// ========== Route Handlers ==========

pub async fn register_tourist(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterTouristRequest>,
) -> ApiResult<(StatusCode, Json<Tourist>)> {
    let fields = [
        ("name", &req.name),
        ("email", &req.email),
        ("phone", &req.phone),
        ("nationality", &req.nationality),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        warn!("Registration rejected: missing {}", field);
        return Err(ApiError::BadRequest(format!("Missing field: {}", field)));
    }

    let tourist = Tourist {
        id: format!("T-{}", Uuid::new_v4().simple()),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone.trim().to_string(),
        nationality: req.nationality.trim().to_string(),
        digital_id: None,
        registered_at: Utc::now(),
    };
    let tourist = state.session.write().await.register(tourist).clone();

    state
        .notifier
        .notify(
            NotificationLevel::Success,
            format!("Welcome {}! Registration successful", tourist.name),
        )
        .await;
    Ok((StatusCode::CREATED, Json(tourist)))
}

/// Issue a digital ID for the registered tourist
pub async fn issue_identity(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<IdentityBlock>)> {
    let block = {
        let mut session = state.session.write().await;
        let tourist = session.tourist()?;
        let user_data = digital_identity::user_data(&tourist.name, &tourist.email, &tourist.phone);
        let block = session.identity.issue(&user_data)?.clone();
        if let Some(tourist) = session.tourist.as_mut() {
            tourist.digital_id = Some(block.id.clone());
        }
        block
    };

    state
        .notifier
        .notify(NotificationLevel::Success, "Digital ID generated successfully")
        .await;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn verify_identity(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyIdentityRequest>,
) -> ApiResult<Json<VerifyIdentityResponse>> {
    let digital_id = req.digital_id.trim().to_string();
    if digital_id.is_empty() {
        return Err(ApiError::BadRequest("No digital ID provided".to_string()));
    }

    let valid = state.session.read().await.identity.verify(&digital_id);
    if valid {
        state
            .notifier
            .notify(NotificationLevel::Success, "Digital identity verified successfully")
            .await;
    } else {
        warn!("Unknown digital ID presented: {}", digital_id);
        state
            .notifier
            .notify(NotificationLevel::Danger, "Invalid or fraudulent digital ID detected")
            .await;
    }
    Ok(Json(VerifyIdentityResponse { digital_id, valid }))
}

pub async fn update_location(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LocationRequest>,
) -> ApiResult<Json<LocationResponse>> {
    let (coordinate, simulated) = match (req.lat, req.lng) {
        (Some(lat), Some(lng)) => (Coordinate::new(lat, lng)?, false),
        (None, None) => (simulated_fix(&mut rand::thread_rng()), true),
        _ => {
            return Err(ApiError::BadRequest(
                "lat and lng must be given together".to_string(),
            ))
        }
    };

    let (location, assessment) = {
        let mut session = state.session.write().await;
        let assessment = session.update_location(coordinate, simulated)?;
        let location = session.location.ok_or(ApiError::NoLocation)?;
        (location, assessment)
    };

    if assessment.is_alerting() {
        state
            .notifier
            .notify(
                NotificationLevel::Danger,
                format!("Warning: You are in a {} zone!", assessment.kind),
            )
            .await;
    }
    let message = if simulated {
        "Location updated (simulated)"
    } else {
        "Location updated successfully"
    };
    state.notifier.notify(NotificationLevel::Success, message).await;

    Ok(Json(LocationResponse { location, assessment }))
}

/// Assess an arbitrary point against the session's fences
pub async fn assess_point(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PointRequest>,
) -> ApiResult<Json<SafetyAssessment>> {
    let point = req.coordinate()?;
    let assessment = state.session.read().await.geofences.assess(point);
    Ok(Json(assessment))
}

pub async fn safety_analysis(State(state): State<AppState>) -> ApiResult<Json<SafetyAnalysis>> {
    let analysis = {
        let session = state.session.read().await;
        let location = session.current_location()?;
        let assessment = session.geofences.assess(location);
        risk_analysis::analyze(assessment, &session.risk_factors)
    };

    state
        .notifier
        .notify(NotificationLevel::Success, "Safety analysis completed")
        .await;
    Ok(Json(analysis))
}

/// Basic SOS: record the incident and stage follow-up notices
pub async fn trigger_sos(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let mut session = state.session.write().await;
    let (tourist_id, location) = session.sos_context()?;
    let incident = session
        .incidents
        .report(&tourist_id, location, Severity::High)
        .clone();
    warn!("SOS raised: {}", incident.id);

    // scheduled under the session lock, which reset also holds while cancelling
    let notifier = &state.notifier;
    notifier
        .schedule(
            Duration::from_secs(1),
            NotificationLevel::Danger,
            "Emergency services have been notified and are on their way!",
        )
        .await;
    notifier
        .schedule(
            Duration::from_secs(3),
            NotificationLevel::Success,
            "Rescue team dispatched to your location",
        )
        .await;
    drop(session);

    Ok((StatusCode::CREATED, Json(incident)))
}

/// Enhanced SOS: critical incident plus dispatch of every available team
pub async fn enhanced_sos(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<EnhancedSosResponse>)> {
    let mut session = state.session.write().await;
    let (tourist_id, location) = session.sos_context()?;
    let incident = session
        .incidents
        .report(&tourist_id, location, Severity::Critical)
        .clone();
    let dispatched = session.roster.dispatch(location);
    warn!(
        "Enhanced SOS {}: {} teams dispatched",
        incident.id,
        dispatched.len()
    );

    let notifier = &state.notifier;
    notifier
        .notify(NotificationLevel::Danger, "EMERGENCY ACTIVATED! Help is on the way!")
        .await;
    let follow_ups = [
        (2, NotificationLevel::Warning, "Emergency teams have been dispatched"),
        (5, NotificationLevel::Warning, "Police unit is en route to your location"),
        (10, NotificationLevel::Success, "Medical team has arrived at your location"),
    ];
    for (secs, level, message) in follow_ups {
        notifier.schedule(Duration::from_secs(secs), level, message).await;
    }
    drop(session);

    Ok((
        StatusCode::CREATED,
        Json(EnhancedSosResponse {
            incident,
            dispatched,
        }),
    ))
}

/// Dispatch available teams to an arbitrary point
pub async fn dispatch_teams(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PointRequest>,
) -> ApiResult<Json<Vec<DispatchRecord>>> {
    let location = req.coordinate()?;
    let dispatched = state.session.write().await.roster.dispatch(location);
    info!("Dispatched {} teams", dispatched.len());
    Ok(Json(dispatched))
}

pub async fn list_teams(State(state): State<AppState>) -> Json<Vec<ResponseTeam>> {
    Json(state.session.read().await.roster.teams().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use emergency_response::TeamKind;
    use geofencing::{Geofence, RiskKind, DEFAULT_CENTER};

    fn state() -> AppState {
        AppState::new(GatewayConfig::default())
    }

    fn registration() -> RegisterTouristRequest {
        RegisterTouristRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91-555-0100".to_string(),
            nationality: "IN".to_string(),
        }
    }

    async fn register(state: &AppState) -> Tourist {
        let (_, Json(tourist)) = register_tourist(State(state.clone()), ApiJson(registration()))
            .await
            .unwrap();
        tourist
    }

    async fn locate(state: &AppState, lat: f64, lng: f64) -> LocationResponse {
        let req = LocationRequest {
            lat: Some(lat),
            lng: Some(lng),
        };
        update_location(State(state.clone()), ApiJson(req)).await.unwrap().0
    }

    #[tokio::test]
    async fn test_register_missing_field() {
        let state = state();
        let mut req = registration();
        req.phone = "  ".to_string();
        let err = register_tourist(State(state.clone()), ApiJson(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("phone")));
        assert!(state.session.read().await.tourist.is_none());
    }

    #[tokio::test]
    async fn test_register_and_identity() {
        let state = state();
        let tourist = register(&state).await;
        assert!(tourist.id.starts_with("T-"));

        let (_, Json(block)) = issue_identity(State(state.clone())).await.unwrap();
        assert!(block.id.starts_with("BC-"));

        let req = VerifyIdentityRequest {
            digital_id: block.id.clone(),
        };
        let Json(verdict) = verify_identity(State(state.clone()), ApiJson(req)).await.unwrap();
        assert!(verdict.valid);

        let req = VerifyIdentityRequest {
            digital_id: "BC-000000000000".to_string(),
        };
        let Json(verdict) = verify_identity(State(state.clone()), ApiJson(req)).await.unwrap();
        assert!(!verdict.valid);

        let session = state.session.read().await;
        assert_eq!(session.tourist.as_ref().unwrap().digital_id, Some(block.id));
    }

    #[tokio::test]
    async fn test_identity_requires_registration() {
        let err = issue_identity(State(state())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotRegistered));
    }

    #[tokio::test]
    async fn test_location_in_danger_zone_alerts() {
        let state = state();
        register(&state).await;
        state
            .session
            .write()
            .await
            .geofences
            .add(Geofence::new("GF-1", "Works", RiskKind::Restricted, DEFAULT_CENTER, 250.0))
            .unwrap();

        let response = locate(&state, DEFAULT_CENTER.latitude, DEFAULT_CENTER.longitude).await;
        assert_eq!(response.assessment.level, 10);
        assert!(!response.location.simulated);

        let notes = state.notifier.recent().await;
        assert!(notes
            .iter()
            .any(|n| n.level == NotificationLevel::Danger && n.message.contains("restricted")));
    }

    #[tokio::test]
    async fn test_simulated_location() {
        let state = state();
        register(&state).await;
        let req = ApiJson(LocationRequest::default());
        let Json(response) = update_location(State(state.clone()), req).await.unwrap();
        assert!(response.location.simulated);
        assert!((response.location.coordinate.latitude - DEFAULT_CENTER.latitude).abs() <= 0.05);
        assert_eq!(response.assessment, SafetyAssessment::OUTSIDE);
    }

    #[tokio::test]
    async fn test_location_rejects_bad_input() {
        let state = state();
        register(&state).await;

        let req = LocationRequest {
            lat: Some(91.0),
            lng: Some(0.0),
        };
        let err = update_location(State(state.clone()), ApiJson(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let req = LocationRequest {
            lat: Some(10.0),
            lng: None,
        };
        let err = update_location(State(state.clone()), ApiJson(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_analysis_needs_location() {
        let state = state();
        register(&state).await;
        let err = safety_analysis(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::NoLocation));

        locate(&state, DEFAULT_CENTER.latitude, DEFAULT_CENTER.longitude).await;
        let Json(analysis) = safety_analysis(State(state.clone())).await.unwrap();
        assert_eq!(analysis.assessment, SafetyAssessment::OUTSIDE);
        assert!(analysis.risk.overall <= 10.0);
        assert!(!analysis.recommendations.is_empty());

        // ambient factors are fixed for the session
        let Json(again) = safety_analysis(State(state.clone())).await.unwrap();
        assert_eq!(again.risk, analysis.risk);
        assert_eq!(again.incident_probability, analysis.incident_probability);
    }

    #[tokio::test(start_paused = true)]
    async fn test_basic_sos_stages_notices() {
        let state = state();
        register(&state).await;
        let err = trigger_sos(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::NoLocation));

        locate(&state, DEFAULT_CENTER.latitude, DEFAULT_CENTER.longitude).await;
        state.notifier.clear().await;

        let (status, Json(incident)) = trigger_sos(State(state.clone())).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(incident.severity, Severity::High);
        assert!(state.notifier.recent().await.is_empty());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.notifier.recent().await.len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let notes = state.notifier.recent().await;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].message, "Rescue team dispatched to your location");

        // basic SOS leaves the roster untouched
        assert_eq!(state.session.read().await.roster.available_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enhanced_sos_dispatches_once() {
        let state = state();
        register(&state).await;
        locate(&state, DEFAULT_CENTER.latitude, DEFAULT_CENTER.longitude).await;

        let (_, Json(first)) = enhanced_sos(State(state.clone())).await.unwrap();
        assert_eq!(first.incident.severity, Severity::Critical);
        assert_eq!(first.dispatched.len(), 3);
        assert_eq!(first.dispatched[0].team_kind, TeamKind::Police);
        assert_eq!(first.dispatched[0].eta_minutes, 2);

        let (_, Json(second)) = enhanced_sos(State(state.clone())).await.unwrap();
        assert!(second.dispatched.is_empty());

        tokio::time::sleep(Duration::from_secs(11)).await;
        let messages: Vec<String> = state
            .notifier
            .recent()
            .await
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert!(messages.contains(&"Medical team has arrived at your location".to_string()));
        assert_eq!(state.session.read().await.incidents.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_and_teams() {
        let state = state();
        let req = PointRequest {
            lat: DEFAULT_CENTER.latitude,
            lng: DEFAULT_CENTER.longitude,
        };
        let Json(records) = dispatch_teams(State(state.clone()), ApiJson(req)).await.unwrap();
        assert_eq!(records.len(), 3);

        let Json(teams) = list_teams(State(state.clone())).await;
        assert!(teams.iter().all(|t| !t.available));

        let req = PointRequest { lat: 0.0, lng: 200.0 };
        assert!(dispatch_teams(State(state), ApiJson(req)).await.is_err());
    }

    #[tokio::test]
    async fn test_assess_point() {
        let state = state();
        state.session.write().await.geofences.seed_demo();
        // GF-DEMO-3 construction area
        let req = PointRequest { lat: 28.62, lng: 77.21 };
        let Json(assessment) = assess_point(State(state), ApiJson(req)).await.unwrap();
        assert_eq!(assessment.kind, RiskKind::Danger);
        assert_eq!(assessment.level, 8);
    }
}
