//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState,
    dashboard::{create_dashboard_transaction, delete_dashboard_transaction, get_dashboard_page},
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
    },
};

/// The text served at the root path.
pub const WELCOME_MESSAGE: &str = "Welcome to the Wallet App Backend";

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed, since the API is meant to be
/// called from a separately hosted dashboard.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::DASHBOARD_TRANSACTIONS,
            post(create_dashboard_transaction),
        )
        .route(
            endpoints::DASHBOARD_DELETE_TRANSACTION,
            post(delete_dashboard_transaction),
        )
        .fallback(get_404_not_found)
        .layer(cors)
        .with_state(state)
}

async fn get_root() -> &'static str {
    WELCOME_MESSAGE
}

async fn get_health() -> &'static str {
    "OK"
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not found" })),
    )
        .into_response()
}
