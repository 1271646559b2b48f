//! Simulated tourist movement
//!
//! While a tourist has a fix, a background loop nudges it by a small random
//! offset and re-assesses the new position.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::notifications::NotificationLevel;
use crate::AppState;
use geo_primitives::Coordinate;
use geofencing::{SafetyAssessment, DEFAULT_CENTER};

/// Maximum drift per tick on each axis (degrees)
pub const DRIFT_DEGREES: f64 = 0.0005;

/// Half-width of the box simulated fixes are drawn from (degrees)
pub const SIMULATED_SPREAD_DEGREES: f64 = 0.05;

pub fn drift_offset<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    (
        rng.gen_range(-DRIFT_DEGREES..=DRIFT_DEGREES),
        rng.gen_range(-DRIFT_DEGREES..=DRIFT_DEGREES),
    )
}

/// Stand-in fix near the default center when the client sends none
pub fn simulated_fix<R: Rng + ?Sized>(rng: &mut R) -> Coordinate {
    DEFAULT_CENTER.offset(
        rng.gen_range(-SIMULATED_SPREAD_DEGREES..=SIMULATED_SPREAD_DEGREES),
        rng.gen_range(-SIMULATED_SPREAD_DEGREES..=SIMULATED_SPREAD_DEGREES),
    )
}

/// One drift step; alerts when the tourist wanders into a risky zone
pub async fn drift_once<R: Rng + ?Sized>(
    state: &AppState,
    rng: &mut R,
) -> Option<SafetyAssessment> {
    let (dlat, dlng) = drift_offset(rng);
    let assessment = state.session.write().await.drift(dlat, dlng)?;

    if assessment.is_alerting() {
        state
            .notifier
            .notify(
                NotificationLevel::Danger,
                format!("Warning: You are in a {} zone!", assessment.kind),
            )
            .await;
    }
    Some(assessment)
}

pub fn spawn_drift(state: AppState, interval: Duration) -> JoinHandle<()> {
    info!("Simulated movement every {:?}", interval);
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(interval);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if drift_once(&state, &mut rng).await.is_none() {
                debug!("No tourist fix to drift");
            }
        }
    })
}
