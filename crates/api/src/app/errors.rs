use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use billzy_core::DomainError;

use crate::app::services::OpenSessionError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.message();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", message),
    }
}

pub fn open_session_error_to_response(err: OpenSessionError) -> axum::response::Response {
    match err {
        OpenSessionError::Domain(err) => domain_error_to_response(err),
        OpenSessionError::Store(err) => {
            tracing::error!(error = %err, "could not open session");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "session_store_unavailable", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
