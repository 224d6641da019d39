use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use billzy_core::SessionId;
use billzy_infra::SessionStore;

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

/// Resolve the bearer token to a live session.
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session_id = match extract_bearer(req.headers()).and_then(|token| {
        token
            .parse::<SessionId>()
            .map_err(|_| StatusCode::UNAUTHORIZED)
    }) {
        Ok(id) => id,
        Err(status) => return unauthorized(status),
    };

    let Some(workspace) = services.sessions().get(session_id) else {
        return unauthorized(StatusCode::UNAUTHORIZED);
    };

    req.extensions_mut()
        .insert(SessionContext::new(session_id, workspace));

    next.run(req).await
}

fn unauthorized(status: StatusCode) -> Response {
    errors::json_error(status, "unauthorized", "login required")
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
