use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

const STORE_PING_TIMEOUT: Duration = Duration::from_secs(2);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/info", get(info))
        .route("/live", get(live))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
    backend: &'static str,
    #[serde(rename = "latencyMs", skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    backend: &'static str,
    active_sessions: usize,
    start_time: String,
    uptime: u64,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

enum StoreCheck {
    Connected { latency_ms: u64 },
    Timeout,
    Disconnected,
}

async fn root(State(state): State<AppState>) -> Response {
    let (ok, store, latency_ms) = match store_check(&state).await {
        StoreCheck::Connected { latency_ms } => (true, "connected", Some(latency_ms)),
        StoreCheck::Timeout => (false, "timeout", None),
        StoreCheck::Disconnected => (false, "disconnected", None),
    };

    let response = HealthResponse {
        status: if ok { "ok" } else { "degraded" },
        store,
        backend: state.stores().backend,
        latency_ms,
        timestamp: now_iso(),
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let response = HealthInfoResponse {
        service: "kotoba-backend",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.stores().backend,
        active_sessions: state.orchestrator().sessions().len(),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
    };

    Json(response).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn store_check(state: &AppState) -> StoreCheck {
    let started = Instant::now();
    match tokio::time::timeout(STORE_PING_TIMEOUT, state.stores().progress.ping()).await {
        Ok(Ok(())) => StoreCheck::Connected {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "store ping failed");
            StoreCheck::Disconnected
        }
        Err(_) => StoreCheck::Timeout,
    }
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
