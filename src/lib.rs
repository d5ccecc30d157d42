//! Wallet is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording income and expense
//! transactions, and a server-rendered dashboard that filters, totals and
//! charts them.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod logging;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use dashboard::{
    Account, Dashboard, DashboardAction, DashboardState, DashboardView, DateRange, LoadTicket,
    Notice, TransactionDraft, TransactionType,
};
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, SQLiteTransactionStore, Transaction, TransactionStore};

use crate::{html::error_view, transaction::NOT_FOUND_MESSAGE};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more of the fields needed to create a transaction was missing
    /// or empty.
    #[error("All fields are required")]
    MissingFields,

    /// A date could not be parsed as a `YYYY-MM-DD` calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A budget could not be parsed as a number.
    #[error("\"{0}\" is not a valid budget")]
    InvalidBudget(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows or a
    /// delete affects no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A delete for the transaction is already in progress on this dashboard.
    #[error("a delete for this transaction is already in progress")]
    DeleteInProgress,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::MissingFields | Error::InvalidDate(_) | Error::InvalidBudget(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": self.to_string() })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            Error::DeleteInProgress => (
                StatusCode::CONFLICT,
                Json(json!({ "message": self.to_string() })),
            )
                .into_response(),
            // Storage errors are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as a full HTML page for the dashboard.
    fn into_page_response(self) -> Response {
        match self {
            Error::InvalidDate(_) | Error::InvalidBudget(_) | Error::MissingFields => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Bad Request",
                    "400",
                    &self.to_string(),
                    "Check the date range and budget, then try again.",
                ),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                error_view(
                    "Not Found",
                    "404",
                    NOT_FOUND_MESSAGE,
                    "Try refreshing the page to see if the transaction has already been deleted.",
                ),
            )
                .into_response(),
            Error::DeleteInProgress => (
                StatusCode::CONFLICT,
                error_view(
                    "Conflict",
                    "409",
                    &self.to_string(),
                    "Wait for the first delete to finish, then refresh the page.",
                ),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Sorry, something went wrong.",
                        "Try again later or check the server logs",
                    ),
                )
                    .into_response()
            }
        }
    }
}
