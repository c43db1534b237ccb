mod dashboard;
mod dictionary;
mod health;
mod lessons;
mod quiz;
mod reviews;
mod settings;
mod stages;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let healthcheck_endpoint = normalize_healthcheck_endpoint(
        std::env::var("HEALTHCHECK_ENDPOINT")
            .ok()
            .as_deref()
            .unwrap_or("/health"),
    );

    let mut app = Router::new()
        .route(
            "/api/learners/:learner_id/dashboard",
            get(dashboard::summary).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/lessons",
            get(lessons::batch).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/lessons/complete",
            post(lessons::complete).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/reviews",
            get(reviews::batch).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/reviews/answer",
            post(reviews::answer).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/quiz/start",
            post(quiz::start).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/quiz/:session_id/answer",
            post(quiz::answer).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/quiz/:session_id/retry",
            post(quiz::retry).fallback(fallback_handler),
        )
        .route("/api/quiz/check", post(quiz::check).fallback(fallback_handler))
        .route(
            "/api/learners/:learner_id/settings",
            get(settings::show).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/reset",
            post(settings::reset).fallback(fallback_handler),
        )
        .route(
            "/api/learners/:learner_id/dictionary/:item_id",
            get(dictionary::detail).fallback(fallback_handler),
        )
        .route("/api/dictionary", get(dictionary::search).fallback(fallback_handler))
        .route("/api/decks", get(dictionary::decks).fallback(fallback_handler))
        .route("/api/srs/stages", get(stages::list).fallback(fallback_handler));

    app = app.nest("/health", health::router());
    if healthcheck_endpoint != "/health" && healthcheck_endpoint != "/" {
        app = app.nest(healthcheck_endpoint.as_str(), health::router());
    }

    app.fallback(fallback_handler).with_state(state)
}

/// Decodes a JSON body, answering malformed input with `VALIDATION_ERROR`.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|err| {
        AppError::validation(format!("invalid request body: {err}")).into_response()
    })
}

fn parse_session_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::validation(format!("invalid session id: {raw}")).into_response())
}

fn parse_item_id(raw: &str) -> Result<i64, Response> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(format!("invalid item id: {raw}")).into_response())
}

fn normalize_healthcheck_endpoint(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/health".to_string();
    }

    let with_slash = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    if with_slash != "/" {
        with_slash.trim_end_matches('/').to_string()
    } else {
        "/".to_string()
    }
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
