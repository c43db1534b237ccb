use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use serde::Serialize;

use crate::response::service_response;
use crate::services::settings::learner_settings;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetAck {
    deleted_records: u64,
}

pub async fn show(State(state): State<AppState>, Path(learner_id): Path<String>) -> Response {
    let result = learner_settings(state.stores(), state.srs_config(), &learner_id, Utc::now()).await;
    service_response(result)
}

pub async fn reset(State(state): State<AppState>, Path(learner_id): Path<String>) -> Response {
    let result = state
        .orchestrator()
        .reset_all(&learner_id)
        .await
        .map(|deleted_records| ResetAck { deleted_records });
    service_response(result)
}
