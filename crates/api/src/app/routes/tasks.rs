use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use billzy_infra::{TaskHandle, TaskId};

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tasks))
        .route("/:id", get(get_task).delete(cancel_task))
}

async fn find_task(
    services: &AppServices,
    session: &SessionContext,
    raw_id: &str,
) -> Result<TaskHandle, axum::response::Response> {
    let task_id: TaskId = raw_id
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid task id"))?;

    services
        .tasks()
        .get(session.session_id(), task_id)
        .await
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found"))
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let mut tasks = Vec::new();
    for handle in services.tasks().list(session.session_id()).await {
        tasks.push(handle.progress().await);
    }
    (StatusCode::OK, Json(serde_json::json!({ "tasks": tasks }))).into_response()
}

/// GET /tasks/:id
pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match find_task(&services, &session, &id).await {
        Ok(handle) => (StatusCode::OK, Json(handle.progress().await)).into_response(),
        Err(response) => response,
    }
}

/// DELETE /tasks/:id
///
/// Requests cancellation; the task stops on its next progress tick.
pub async fn cancel_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let handle = match find_task(&services, &session, &id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    handle.cancel();
    tracing::info!(session_id = %session.session_id(), task_id = %handle.id(), "task cancellation requested");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "taskId": handle.id(),
            "message": "Task cancellation requested",
        })),
    )
        .into_response()
}
