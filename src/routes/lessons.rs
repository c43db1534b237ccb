use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::db::models::LessonSource;
use crate::response::{service_response, AppError};
use crate::state::AppState;

use super::parse_body;

#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    source: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    item_ids: Vec<i64>,
}

pub async fn batch(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
    Query(query): Query<LessonQuery>,
) -> Response {
    let limit = match query.limit.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) => Some(value),
            Err(_) => {
                return AppError::validation("limit must be a non-negative integer").into_response();
            }
        },
    };
    let source = LessonSource::parse(query.source.as_deref().unwrap_or(""));

    let result = state
        .orchestrator()
        .lesson_batch(&learner_id, &source, limit, Utc::now())
        .await;
    service_response(result)
}

pub async fn complete(State(state): State<AppState>, Path(learner_id): Path<String>, body: Bytes) -> Response {
    let payload: CompleteRequest = match parse_body(&body) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .complete_lessons(&learner_id, &payload.item_ids, Utc::now())
        .await;
    service_response(result)
}
