use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/uploads", post(upload_to_portal))
        .route("/receipt", get(get_receipt))
}

/// POST /portal/uploads
pub async fn upload_to_portal(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let handle = services.start_portal_upload(&session).await;
    (StatusCode::ACCEPTED, Json(handle.progress().await)).into_response()
}

pub async fn get_receipt(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    match session.workspace().lock().await.receipt() {
        Some(receipt) => (StatusCode::OK, Json(receipt.clone())).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "no portal upload yet"),
    }
}
