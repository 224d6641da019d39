use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use billzy_workflow::{FileSelection, SUPPORTED_EXTENSIONS};

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/", post(upload_bills))
}

/// POST /uploads
///
/// Filters the selection by extension and starts extraction of the accepted
/// files. The working set is replaced when the task completes.
pub async fn upload_bills(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::UploadRequest>,
) -> axum::response::Response {
    let selection = FileSelection::filter(body.files);
    if selection.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!(
                "no supported files selected (accepted: .{})",
                SUPPORTED_EXTENSIONS.join(", .")
            ),
        );
    }
    if !selection.rejected.is_empty() {
        tracing::info!(
            session_id = %session.session_id(),
            rejected = selection.rejected.len(),
            "unsupported files skipped"
        );
    }

    let handle = services
        .start_extraction(&session, selection.accepted.clone())
        .await;
    (
        StatusCode::ACCEPTED,
        Json(dto::UploadResponse {
            task: handle.progress().await,
            selection,
        }),
    )
        .into_response()
}
