use axum::{
    routing::{get, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{handlers, service::ExpenseService};

/// Create the application router: expense API, health check, and static
/// files from `static_dir` for everything else
pub fn create_router(service: Arc<ExpenseService>, static_dir: impl AsRef<Path>) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        .with_state(service)
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
