//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MESSAGES
// ============================================================================

/// The message sent after a transaction is created.
pub const TRANSACTION_ADDED_MESSAGE: &str = "Transaction added successfully!";
/// The message sent when a transaction could not be created.
pub const ADD_FAILED_MESSAGE: &str = "Failed to add transaction";
/// The message sent after a transaction is deleted.
pub const TRANSACTION_DELETED_MESSAGE: &str = "Transaction deleted successfully!";
/// The message sent when a transaction could not be deleted.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete transaction";
/// The message sent when a transaction does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Transaction not found";

// ============================================================================
// MODELS
// ============================================================================

/// An income or expense recorded against one of the user's accounts.
///
/// All fields are stored exactly as they were submitted. The dashboard is
/// responsible for interpreting `amount` as a number and `date` as a calendar
/// date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database.
    pub id: TransactionId,
    /// The account the money moved through, e.g. "Cash".
    pub account: String,
    /// Whether the transaction is an "Income" or "Expense".
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// The amount of money, as submitted.
    pub amount: String,
    /// When the transaction happened, as `YYYY-MM-DD`.
    pub date: String,
}

/// The fields for a transaction that has not been stored yet.
///
/// Every field is guaranteed to be non-empty. The values are otherwise not
/// checked, e.g. `account` may be any string.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    account: String,
    transaction_type: String,
    amount: String,
    date: String,
}

impl NewTransaction {
    /// Create a new transaction from its raw fields.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if any of the fields is empty.
    pub fn new(
        account: impl Into<String>,
        transaction_type: impl Into<String>,
        amount: impl Into<String>,
        date: impl Into<String>,
    ) -> Result<Self, Error> {
        let new_transaction = Self {
            account: account.into(),
            transaction_type: transaction_type.into(),
            amount: amount.into(),
            date: date.into(),
        };

        if new_transaction.account.is_empty()
            || new_transaction.transaction_type.is_empty()
            || new_transaction.amount.is_empty()
            || new_transaction.date.is_empty()
        {
            return Err(Error::MissingFields);
        }

        Ok(new_transaction)
    }

    /// The account the money moved through.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Whether the transaction is an income or expense.
    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    /// The amount of money.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// When the transaction happened.
    pub fn date(&self) -> &str {
        &self.date
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a new transaction into the database.
///
/// The ID is assigned and returned by the same statement, so the returned
/// transaction always carries the ID of the row that was written.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions (account, type, amount, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, account, type, amount, date",
        )?
        .query_row(
            (
                new_transaction.account,
                new_transaction.transaction_type,
                new_transaction.amount,
                new_transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction in the order they are stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare("SELECT id, account, type, amount, date FROM transactions")?
        .query_map([], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}

/// Delete the transaction with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account TEXT NOT NULL,
                type TEXT NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let account = row.get(1)?;
    let transaction_type = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;

    Ok(Transaction {
        id,
        account,
        transaction_type,
        amount,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
