//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    transaction::{
        ADD_FAILED_MESSAGE, NewTransaction, SQLiteTransactionStore, TRANSACTION_ADDED_MESSAGE,
        TransactionStore,
    },
};

/// A field of the JSON body.
///
/// Any JSON value is accepted and stored in its textual form: strings as they
/// are, other values as JSON text. Only values that count as empty are
/// rejected.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    /// The text to store, or `None` if the value is `null`, `""`, `0` or `false`.
    fn into_text(self) -> Option<String> {
        match self.0 {
            Value::Null | Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::Number(number) if number.as_f64() == Some(0.0) => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

/// The JSON body for creating a transaction.
///
/// Every field is optional and untyped here so that a missing or empty field
/// is reported as [Error::MissingFields] instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// The account the money moved through.
    pub account: Option<FieldValue>,
    /// "Income" or "Expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<FieldValue>,
    /// The amount of money.
    pub amount: Option<FieldValue>,
    /// When the transaction happened, as `YYYY-MM-DD`.
    pub date: Option<FieldValue>,
}

fn field_text(field: Option<FieldValue>) -> String {
    field.and_then(FieldValue::into_text).unwrap_or_default()
}

impl TryFrom<TransactionRequest> for NewTransaction {
    type Error = Error;

    fn try_from(request: TransactionRequest) -> Result<Self, Self::Error> {
        NewTransaction::new(
            field_text(request.account),
            field_text(request.transaction_type),
            field_text(request.amount),
            field_text(request.date),
        )
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction on success.
pub async fn create_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected transaction body: {rejection}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let new_transaction = match NewTransaction::try_from(request) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_response(),
    };

    match store.create(new_transaction) {
        Ok(transaction) => {
            tracing::info!("Created transaction {}", transaction.id);
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": TRANSACTION_ADDED_MESSAGE,
                    "transaction": transaction,
                })),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Error inserting transaction: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": ADD_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}
