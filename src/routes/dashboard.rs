use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;

use crate::response::service_response;
use crate::state::AppState;

pub async fn summary(State(state): State<AppState>, Path(learner_id): Path<String>) -> Response {
    service_response(state.dashboard().summary(&learner_id, Utc::now()).await)
}
