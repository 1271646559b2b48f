//! Safety Check Tooling
//!
//! Loads geofence and response-team files exported from the gateway (or
//! written by hand) and runs the risk evaluator and dispatch planner on them.

use thiserror::Error;

pub mod loader;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unrecognised file layout in {0}")]
    UnknownLayout(String),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
