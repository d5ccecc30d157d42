//! Defines the endpoint for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        DELETE_FAILED_MESSAGE, SQLiteTransactionStore, TRANSACTION_DELETED_MESSAGE,
        TransactionStore,
    },
};

/// A route handler for deleting a transaction by its ID.
///
/// An ID that is not an integer cannot refer to a transaction, so it is
/// treated the same as an ID that does not exist.
pub async fn delete_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let Ok(Path(transaction_id)) = transaction_id else {
        return Error::NotFound.into_response();
    };

    match store.delete(transaction_id) {
        Ok(()) => {
            tracing::info!("Deleted transaction {transaction_id}");
            Json(json!({ "message": TRANSACTION_DELETED_MESSAGE })).into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Error deleting transaction {transaction_id}: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": DELETE_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}
