use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ViolationSet};

use api_types::error::{ErrorResponse, FieldViolation, ValidationErrorResponse};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod dashboard;
mod entries;
pub mod export;
mod reports;
mod sales;
mod server;

pub enum ServerError {
    Engine(EngineError),
    Report(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidTimestamp(_)
        | EngineError::Document(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidTimestamp(detail) | EngineError::Document(detail) => {
            tracing::error!("malformed stored document: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn violation_body(violations: ViolationSet) -> ValidationErrorResponse {
    ValidationErrorResponse {
        error: "validation failed".to_string(),
        violations: violations
            .into_iter()
            .map(|violation| FieldViolation {
                field: violation.field().to_string(),
                message: violation.message(),
            })
            .collect(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Engine(EngineError::Invalid(violations)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(violation_body(violations)),
            )
                .into_response(),
            ServerError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let error = message_for_engine_error(err);
                (status, Json(ErrorResponse { error })).into_response()
            }
            ServerError::Report(detail) => {
                tracing::error!("report rendering failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
            ServerError::Generic(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
