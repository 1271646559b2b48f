//! Request extractors

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body whose rejections come back as `{"error": ...}` with 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
