//! Defines the transaction store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::core::{
        NewTransaction, Transaction, create_transaction, delete_transaction, get_all_transactions,
    },
};

/// Handles the creation, retrieval and deletion of transactions.
pub trait TransactionStore {
    /// Retrieve every transaction in storage order.
    fn list(&self) -> Result<Vec<Transaction>, Error>;

    /// Store a new transaction and return it with its assigned ID.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Delete the transaction with `id`.
    ///
    /// Implementers should return [Error::NotFound] if no transaction has the ID `id`.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;
}

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The transaction table must already exist, see [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl FromRef<AppState> for SQLiteTransactionStore {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db_connection.clone())
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn list(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        get_all_transactions(&connection)
    }

    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        create_transaction(new_transaction, &connection)
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.lock()?;

        delete_transaction(id, &connection)
    }
}
