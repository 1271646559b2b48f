use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod authority_routes;
mod config;
mod error;
mod extract;
mod movement;
mod notifications;
mod routes;
mod session;

use config::GatewayConfig;
use notifications::Notifier;
use session::Session;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub notifier: Notifier,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::new())),
            notifier: Notifier::new(config.notification_log),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "safety_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    let state = AppState::new(config.clone());

    match config.drift_interval {
        Some(interval) => {
            movement::spawn_drift(state.clone(), interval);
        }
        None => tracing::info!("   Simulated movement disabled"),
    }

    let api_routes = build_router(state);

    // Static file serving for UI (if configured and present)
    let app = match config.ui_dir.as_deref() {
        Some(ui_path) if ui_path.exists() => {
            tracing::info!("   Serving UI from {}", ui_path.display());
            api_routes.fallback_service(ServeDir::new(ui_path))
        }
        Some(ui_path) => {
            tracing::warn!("   UI directory {} not found", ui_path.display());
            api_routes
        }
        None => api_routes,
    };

    let addr = config.listen_addr();
    tracing::info!("Safety Gateway starting on {}", addr);
    tracing::info!("   Authority account: {}", config.authority_id);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let tourist_routes = Router::new()
        .route("/tourists", post(routes::register_tourist))
        .route("/identity", post(routes::issue_identity))
        .route("/identity/verify", post(routes::verify_identity))
        .route("/location", post(routes::update_location))
        .route("/assess", post(routes::assess_point))
        .route("/analysis", get(routes::safety_analysis))
        .route("/sos", post(routes::trigger_sos))
        .route("/sos/enhanced", post(routes::enhanced_sos))
        .route("/dispatch", post(routes::dispatch_teams))
        .route("/teams", get(routes::list_teams));

    let authority_routes = Router::new()
        .route("/authority/login", post(authority_routes::authority_login))
        .route(
            "/geofences",
            get(authority_routes::list_geofences).post(authority_routes::create_geofence),
        )
        .route("/incidents", get(authority_routes::list_incidents))
        .route("/incidents/:id/resolve", post(authority_routes::resolve_incident))
        .route("/reports/incidents", get(authority_routes::incident_report))
        .route("/stats", get(authority_routes::session_stats))
        .route("/notifications", get(authority_routes::list_notifications))
        .route("/reset", post(authority_routes::reset_session));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", tourist_routes.merge(authority_routes))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "safety-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
