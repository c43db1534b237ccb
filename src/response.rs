use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::SrsError;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Body for legitimate empty states ("nothing due", "no new words").
#[derive(Debug, Serialize)]
pub struct EmptyResponse {
    pub success: bool,
    pub data: Vec<serde_json::Value>,
    pub empty: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn operational(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<SrsError> for AppError {
    fn from(err: SrsError) -> Self {
        match err {
            SrsError::NotFound(message) => Self::not_found(message),
            SrsError::InvalidInput(message) => Self::validation(message),
            SrsError::Conflict(message) => Self::conflict(message),
            SrsError::Unavailable(message) => {
                tracing::error!(error = %message, "store unavailable");
                Self::unavailable("Storage is temporarily unavailable")
            }
            // Routes render empty states themselves; reaching here is a wiring bug.
            SrsError::NoContent(message) => Self::internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> AppError {
    AppError::operational(status, code, message)
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(SuccessResponse { success: true, data }).into_response()
}

/// Renders a service result: data on success, a 200 empty-state body for
/// `NoContent`, the mapped error otherwise.
pub fn service_response<T: Serialize>(result: Result<T, SrsError>) -> Response {
    match result {
        Ok(data) => ok(data),
        Err(SrsError::NoContent(message)) => Json(EmptyResponse {
            success: true,
            data: Vec::new(),
            empty: true,
            message,
        })
        .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
