//! Defines the endpoint for listing every transaction.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::transaction::{SQLiteTransactionStore, TransactionStore};

/// A route handler that responds with every stored transaction as
/// `{ "transactions": [...] }`.
pub async fn list_transactions_endpoint(State(store): State<SQLiteTransactionStore>) -> Response {
    match store.list() {
        Ok(transactions) => Json(json!({ "transactions": transactions })).into_response(),
        Err(error) => {
            tracing::error!("Database query error: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database query failed" })),
            )
                .into_response()
        }
    }
}
