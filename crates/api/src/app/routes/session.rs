use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use billzy_workflow::{Credentials, Screen};

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

/// POST /login
///
/// Opens a session. The returned `sessionId` is the bearer token for every
/// other route.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(credentials): Json<Credentials>,
) -> axum::response::Response {
    let session = match services.open_session(&credentials).await {
        Ok(session) => session,
        Err(e) => return errors::open_session_error_to_response(e),
    };

    let ws = session.workspace().lock().await;
    (
        StatusCode::OK,
        Json(dto::SessionResponse {
            session_id: session.session_id(),
            email: ws.email().map(str::to_string),
            screen: ws.screen(),
        }),
    )
        .into_response()
}

/// POST /logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services.close_session(&session).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "screen": Screen::Login })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /screen
pub async fn current_screen(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let screen = session.workspace().lock().await.screen();
    (StatusCode::OK, Json(dto::ScreenResponse::new(screen))).into_response()
}

/// POST /screen
pub async fn navigate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::NavigateRequest>,
) -> axum::response::Response {
    let to: Screen = match body.screen.parse() {
        Ok(screen) => screen,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .apply(session.workspace(), |ws| {
            ws.navigate(to)?;
            Ok(ws.screen())
        })
        .await
    {
        Ok(screen) => (StatusCode::OK, Json(dto::ScreenResponse::new(screen))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /dashboard
pub async fn dashboard(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let ws = session.workspace().lock().await;
    (
        StatusCode::OK,
        Json(dto::DashboardResponse {
            email: ws.email().map(str::to_string),
            stats: ws.dashboard(),
        }),
    )
        .into_response()
}
