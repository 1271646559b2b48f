use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use digital_identity::IdentityError;
use emergency_response::ResponseError;
use geo_primitives::GeoError;
use geofencing::GeofenceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Please register first")]
    NotRegistered,
    #[error("Location not available")]
    NoLocation,
    #[error("Please login as authority first")]
    NotAuthority,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No incidents to export")]
    NoIncidents,
    #[error(transparent)]
    Coordinate(#[from] GeoError),
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::Coordinate(_)
            | Self::Geofence(_)
            | Self::Identity(_) => StatusCode::BAD_REQUEST,
            Self::NotRegistered | Self::NoLocation => StatusCode::CONFLICT,
            Self::NotAuthority => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NoIncidents | Self::Response(ResponseError::IncidentNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Response(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
