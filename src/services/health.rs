use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::connection::DatabaseManager;
use crate::database::models::{ActivationCode, Subscriber};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: String,
    /// Subscribers currently marked active in the ledger.
    pub active_subscribers: i64,
    /// Activation codes still available for redemption.
    pub unused_codes: i64,
    pub uptime_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        let state = AppState {
            db,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/live", get(liveness_check))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let pool = &state.db.pool;

    let active_subscribers = Subscriber::count_active(pool).await;
    let unused_codes = ActivationCode::count_unused(pool).await;

    let (database, active_subscribers, unused_codes) =
        match (active_subscribers, unused_codes) {
            (Ok(subs), Ok(codes)) => ("healthy".to_string(), subs, codes),
            _ => return Err(StatusCode::SERVICE_UNAVAILABLE),
        };

    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        active_subscribers,
        unused_codes,
        uptime_seconds: uptime,
    }))
}

async fn liveness_check() -> Json<&'static str> {
    // If this endpoint responds, the process is alive
    Json("alive")
}
