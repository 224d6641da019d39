use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use billzy_workflow::ExportKind;

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_exports))
        .route("/:kind", post(generate_export))
}

pub async fn list_exports(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let exports = session.workspace().lock().await.exports().to_vec();
    (StatusCode::OK, Json(serde_json::json!({ "exports": exports }))).into_response()
}

/// POST /exports/:kind (`tally` or `gst`)
pub async fn generate_export(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(kind): Path<String>,
) -> axum::response::Response {
    let kind: ExportKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let handle = services.start_export(&session, kind).await;
    (StatusCode::ACCEPTED, Json(handle.progress().await)).into_response()
}
