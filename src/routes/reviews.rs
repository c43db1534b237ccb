use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::response::{service_response, AppError};
use crate::services::session::ReviewAnswer;
use crate::state::AppState;

use super::parse_body;

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    seed: Option<String>,
}

pub async fn batch(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> Response {
    let seed = match query.seed.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => return AppError::validation("seed must be an unsigned integer").into_response(),
        },
    };

    let result = state
        .orchestrator()
        .review_batch(&learner_id, seed, Utc::now())
        .await;
    service_response(result)
}

pub async fn answer(State(state): State<AppState>, Path(learner_id): Path<String>, body: Bytes) -> Response {
    let payload: ReviewAnswer = match parse_body(&body) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .submit_answer(&learner_id, &payload, Utc::now())
        .await;
    service_response(result)
}
