use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use billzy_invoicing::InvoiceId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices))
        .route("/auto-fix", post(auto_fix))
        .route("/continue", post(continue_to_generate))
        .route("/:id", get(get_invoice).put(edit_invoice))
}

pub async fn list_invoices(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let ws = session.workspace().lock().await;
    (
        StatusCode::OK,
        Json(dto::InvoicesResponse {
            invoices: ws.invoices().to_vec(),
            counts: ws.batch().counts(),
        }),
    )
        .into_response()
}

pub async fn get_invoice(
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let ws = session.workspace().lock().await;
    match ws.batch().get(&InvoiceId::new(id)) {
        Some(invoice) => (StatusCode::OK, Json(invoice.clone())).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
    }
}

/// PUT /invoices/:id
///
/// Saves the edit form. The invoice comes back validated whatever the values.
pub async fn edit_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::EditInvoiceRequest>,
) -> axum::response::Response {
    let invoice_id = InvoiceId::new(id);
    let fields = body.into_fields();

    match services
        .apply(session.workspace(), |ws| {
            ws.edit_invoice(&invoice_id, fields).cloned()
        })
        .await
    {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /invoices/auto-fix
pub async fn auto_fix(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services
        .apply(session.workspace(), |ws| {
            let fixed = ws.auto_fix()?;
            Ok(dto::AutoFixResponse {
                fixed,
                counts: ws.batch().counts(),
            })
        })
        .await
    {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /invoices/continue
///
/// 422 while any invoice is erroring; otherwise moves to the generate screen.
pub async fn continue_to_generate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services
        .apply(session.workspace(), |ws| {
            ws.continue_to_generate()?;
            Ok(ws.screen())
        })
        .await
    {
        Ok(screen) => (StatusCode::OK, Json(dto::ScreenResponse::new(screen))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
