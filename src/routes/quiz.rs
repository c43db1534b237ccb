use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;

use crate::response::service_response;
use crate::services::session::QuizRequest;
use crate::srs::Direction;
use crate::state::AppState;

use super::{parse_body, parse_session_id};

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest {
    item_id: i64,
    direction: Direction,
    answer: String,
}

pub async fn start(State(state): State<AppState>, Path(learner_id): Path<String>, body: Bytes) -> Response {
    let payload: QuizRequest = match parse_body(&body) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .start_quiz(&learner_id, &payload, Utc::now())
        .await;
    service_response(result)
}

pub async fn answer(
    State(state): State<AppState>,
    Path((learner_id, session_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let payload: AnswerRequest = match parse_body(&body) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .answer_quiz(&learner_id, session_id, &payload.answer, Utc::now())
        .await;
    service_response(result)
}

pub async fn retry(
    State(state): State<AppState>,
    Path((learner_id, session_id)): Path<(String, String)>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .retry_quiz(&learner_id, session_id, Utc::now())
        .await;
    service_response(result)
}

pub async fn check(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: CheckRequest = match parse_body(&body) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let result = state
        .orchestrator()
        .quiz_check(payload.item_id, payload.direction, &payload.answer)
        .await;
    service_response(result)
}
