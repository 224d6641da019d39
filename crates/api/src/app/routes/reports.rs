use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use billzy_invoicing::BatchReport;

use crate::app::dto;
use crate::context::SessionContext;

/// GET /reports
pub async fn report(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let ws = session.workspace().lock().await;
    let body = dto::ReportResponse {
        report: BatchReport::from_invoices(ws.invoices()),
        downloads: dto::DownloadHistory {
            exports: ws.exports().to_vec(),
            receipt: ws.receipt().cloned(),
        },
    };
    (StatusCode::OK, Json(body)).into_response()
}
