use axum::{
    Router,
    routing::{get, post},
};

pub mod exports;
pub mod invoices;
pub mod portal;
pub mod reports;
pub mod session;
pub mod system;
pub mod tasks;
pub mod uploads;

/// Router for all session-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/logout", post(session::logout))
        .route("/screen", get(session::current_screen).post(session::navigate))
        .route("/dashboard", get(session::dashboard))
        .route("/stream", get(system::stream))
        .route("/reports", get(reports::report))
        .nest("/uploads", uploads::router())
        .nest("/invoices", invoices::router())
        .nest("/exports", exports::router())
        .nest("/portal", portal::router())
        .nest("/tasks", tasks::router())
}
