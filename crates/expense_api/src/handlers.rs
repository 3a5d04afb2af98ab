use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{extract::JsonFields, models::parse_expense_id, service::ExpenseService, Result};

pub type ServiceState = Arc<ExpenseService>;

/// GET /api/expenses
/// Returns all expenses, newest first
pub async fn list_expenses(State(service): State<ServiceState>) -> impl IntoResponse {
    Json(service.list().await)
}

/// POST /api/expenses
/// Creates an expense from arbitrary fields; the server assigns `id` and `date`.
/// An empty body creates an expense holding only those two fields.
pub async fn create_expense(
    State(service): State<ServiceState>,
    JsonFields(fields): JsonFields,
) -> Result<impl IntoResponse> {
    let expense = service.create(fields).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/:id
/// Merges the given fields into an existing expense
pub async fn update_expense(
    State(service): State<ServiceState>,
    Path(raw_id): Path<String>,
    JsonFields(fields): JsonFields,
) -> Result<impl IntoResponse> {
    let expense = service.update(parse_expense_id(&raw_id), fields).await?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/:id
/// Always reports success, even when nothing matched
pub async fn delete_expense(
    State(service): State<ServiceState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    service.delete(parse_expense_id(&raw_id)).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "expense-api"
    }))
}
