//! Transaction management for the wallet.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction`
//! - Database functions and the `TransactionStore` for storing, listing and deleting transactions
//! - The JSON route handlers for the transaction API

mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod list_transactions_endpoint;
mod store;

pub use core::{
    ADD_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, NOT_FOUND_MESSAGE, NewTransaction,
    TRANSACTION_ADDED_MESSAGE, TRANSACTION_DELETED_MESSAGE, Transaction, create_transaction_table,
};
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use delete_transaction_endpoint::delete_transaction_endpoint;
pub use list_transactions_endpoint::list_transactions_endpoint;
pub use store::{SQLiteTransactionStore, TransactionStore};
