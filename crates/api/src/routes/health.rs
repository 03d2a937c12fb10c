//! Liveness endpoint for load balancers, mounted outside `/api/v1` and open
//! without a token.

use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use uswds_pt_core::fingerprint::{default_backend, DigestBackend};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of `SELECT 1`; absent when the database is down.
    pub db_latency_ms: Option<u64>,
    /// Digest implementation used for content checksums in this build.
    pub checksum_backend: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let db_result = uswds_pt_db::health_check(&state.pool).await;
    let db_latency_ms = match db_result {
        Ok(()) => Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the database");
            None
        }
    };
    let db_healthy = db_latency_ms.is_some();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
        checksum_backend: default_backend().name(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
