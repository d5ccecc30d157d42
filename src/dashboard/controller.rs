//! Drives the dashboard's fetch and derive pipeline against a transaction store.

use crate::{
    Error,
    dashboard::{
        aggregation::DateRange,
        state::{DashboardAction, DashboardState, TransactionDraft},
    },
    database_id::TransactionId,
    transaction::{
        ADD_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, NOT_FOUND_MESSAGE, TRANSACTION_ADDED_MESSAGE,
        TRANSACTION_DELETED_MESSAGE, Transaction, TransactionStore,
    },
};

/// The message shown when the transaction list could not be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load transactions";
/// The message shown when a delete is refused because one is already in flight.
pub const DELETE_IN_PROGRESS_MESSAGE: &str = "This transaction is already being deleted";

/// Issues requests to a [TransactionStore] and applies their outcome to a
/// [DashboardState].
///
/// Every outcome, good or bad, is recorded as a notice on the state. The
/// `Result`s returned here let callers pick a status code.
///
/// Request sequencing (stale load tickets, refusing a second delete of an id
/// already in flight) applies to the requests made through one `Dashboard`.
/// The HTTP handlers build a fresh `Dashboard` per request, so across
/// requests the store is the only arbiter: a second delete of the same id
/// gets [Error::NotFound] from the store.
#[derive(Debug)]
pub struct Dashboard<S> {
    store: S,
    state: DashboardState,
}

impl<S: TransactionStore> Dashboard<S> {
    /// Create a dashboard with an empty state.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: DashboardState::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Fetch every transaction from the store.
    ///
    /// # Errors
    /// Returns the store's error if the transactions could not be listed. The
    /// transaction list is left as it was.
    pub fn load(&mut self) -> Result<(), Error> {
        let ticket = self.state.begin_load();

        match self.store.list() {
            Ok(transactions) => {
                tracing::debug!("Loaded {} transactions", transactions.len());
                self.state.apply(DashboardAction::Loaded {
                    ticket,
                    transactions,
                });
                Ok(())
            }
            Err(error) => {
                tracing::error!("Error fetching transactions: {error}");
                self.state.apply(DashboardAction::LoadFailed {
                    ticket,
                    message: LOAD_FAILED_MESSAGE.to_owned(),
                });
                Err(error)
            }
        }
    }

    /// Filter the dashboard to `range`.
    pub fn set_date_range(&mut self, range: DateRange) {
        self.state.apply(DashboardAction::SetDateRange(range));
    }

    /// Set or clear the budget for expenses.
    pub fn set_budget(&mut self, budget: Option<f64>) {
        self.state.apply(DashboardAction::SetBudget(budget));
    }

    /// Validate `draft` and, if it is complete, store it as a new transaction.
    ///
    /// On success the stored transaction is appended to the list without
    /// fetching the list again, and the draft is cleared.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] without contacting the store if a field
    /// is empty, or the store's error if the transaction could not be created.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        self.state.apply(DashboardAction::EditDraft(draft));

        let new_transaction = match self.state.draft().validate() {
            Ok(new_transaction) => new_transaction,
            Err(error) => {
                self.state.apply(DashboardAction::DraftRejected);
                return Err(error);
            }
        };

        match self.store.create(new_transaction) {
            Ok(transaction) => {
                self.state.apply(DashboardAction::TransactionCreated {
                    transaction: transaction.clone(),
                    message: TRANSACTION_ADDED_MESSAGE.to_owned(),
                });
                Ok(transaction)
            }
            Err(error) => {
                tracing::error!("Error adding transaction: {error}");
                self.state
                    .apply(DashboardAction::CreateFailed(ADD_FAILED_MESSAGE.to_owned()));
                Err(error)
            }
        }
    }

    /// Delete the transaction `id` from the store and then from the list.
    ///
    /// # Errors
    /// Returns [Error::DeleteInProgress] without contacting the store if a
    /// delete of `id` is already in flight on this dashboard,
    /// [Error::NotFound] if the store has no transaction `id`, or the store's
    /// error if the delete failed. The list is left as it was.
    pub fn delete(&mut self, id: TransactionId) -> Result<(), Error> {
        if !self.state.begin_delete(id) {
            tracing::warn!("Delete of transaction {id} is already in flight");
            self.state.apply(DashboardAction::DeleteRefused {
                message: DELETE_IN_PROGRESS_MESSAGE.to_owned(),
            });
            return Err(Error::DeleteInProgress);
        }

        match self.store.delete(id) {
            Ok(()) => {
                self.state.apply(DashboardAction::TransactionDeleted {
                    id,
                    message: TRANSACTION_DELETED_MESSAGE.to_owned(),
                });
                Ok(())
            }
            Err(error) => {
                let message = match error {
                    Error::NotFound => NOT_FOUND_MESSAGE,
                    ref error => {
                        tracing::error!("Error deleting transaction {id}: {error}");
                        DELETE_FAILED_MESSAGE
                    }
                };
                self.state.apply(DashboardAction::DeleteFailed {
                    id,
                    message: message.to_owned(),
                });
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        rc::Rc,
        sync::{Arc, Mutex},
    };

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        dashboard::{
            aggregation::DateRange,
            controller::{DELETE_IN_PROGRESS_MESSAGE, Dashboard, LOAD_FAILED_MESSAGE},
            state::{INCOMPLETE_DRAFT_MESSAGE, Notice, TransactionDraft},
        },
        database_id::TransactionId,
        db::initialize,
        transaction::{NewTransaction, SQLiteTransactionStore, Transaction, TransactionStore},
    };

    /// A store that fails every request.
    struct BrokenStore;

    impl TransactionStore for BrokenStore {
        fn list(&self) -> Result<Vec<Transaction>, Error> {
            Err(Error::DatabaseLockError)
        }

        fn create(&self, _: NewTransaction) -> Result<Transaction, Error> {
            Err(Error::DatabaseLockError)
        }

        fn delete(&self, _: TransactionId) -> Result<(), Error> {
            Err(Error::DatabaseLockError)
        }
    }

    /// A store that serves a fixed list and counts the requests it receives.
    #[derive(Default)]
    struct CountingStore {
        transactions: Vec<Transaction>,
        requests: Rc<Cell<usize>>,
    }

    impl TransactionStore for CountingStore {
        fn list(&self) -> Result<Vec<Transaction>, Error> {
            self.requests.set(self.requests.get() + 1);
            Ok(self.transactions.clone())
        }

        fn create(&self, _: NewTransaction) -> Result<Transaction, Error> {
            self.requests.set(self.requests.get() + 1);
            Err(Error::DatabaseLockError)
        }

        fn delete(&self, _: TransactionId) -> Result<(), Error> {
            self.requests.set(self.requests.get() + 1);
            Err(Error::NotFound)
        }
    }

    fn get_test_store() -> SQLiteTransactionStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))
    }

    fn draft(account: &str, transaction_type: &str, amount: &str, date: &str) -> TransactionDraft {
        TransactionDraft {
            account: account.to_owned(),
            transaction_type: transaction_type.to_owned(),
            amount: amount.to_owned(),
            date: date.to_owned(),
        }
    }

    #[test]
    fn load_fetches_every_transaction() {
        let store = get_test_store();
        store
            .create(NewTransaction::new("Cash", "Income", "100", "2024-01-01").unwrap())
            .unwrap();
        store
            .create(NewTransaction::new("Cash", "Expense", "30", "2024-01-05").unwrap())
            .unwrap();
        let mut dashboard = Dashboard::new(store);

        dashboard.load().unwrap();

        assert_eq!(dashboard.state().transactions().len(), 2);
        assert_eq!(dashboard.state().view().total_expenses, 30.0);
    }

    #[test]
    fn load_failure_sets_error_notice() {
        let mut dashboard = Dashboard::new(BrokenStore);

        let result = dashboard.load();

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert!(dashboard.state().transactions().is_empty());
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error(LOAD_FAILED_MESSAGE.to_owned()))
        );
    }

    #[test]
    fn add_appends_stored_transaction() {
        let mut dashboard = Dashboard::new(get_test_store());
        dashboard.load().unwrap();

        let transaction = dashboard
            .add(draft("Cash", "Income", "100", "2024-01-01"))
            .unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(dashboard.state().transactions(), &[transaction]);
        assert_eq!(dashboard.state().draft(), &TransactionDraft::default());
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Success("Transaction added successfully!".to_owned()))
        );
    }

    #[test]
    fn incomplete_draft_is_not_submitted() {
        let store = CountingStore::default();
        let requests = store.requests.clone();
        let mut dashboard = Dashboard::new(store);

        let result = dashboard.add(draft("Cash", "", "100", "2024-01-01"));

        assert_eq!(result, Err(Error::MissingFields));
        assert_eq!(requests.get(), 0);
        assert_eq!(dashboard.state().draft().account, "Cash");
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error(INCOMPLETE_DRAFT_MESSAGE.to_owned()))
        );
    }

    #[test]
    fn failed_add_keeps_list_and_draft() {
        let mut dashboard = Dashboard::new(CountingStore::default());
        let submitted = draft("Cash", "Income", "100", "2024-01-01");

        let result = dashboard.add(submitted.clone());

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert!(dashboard.state().transactions().is_empty());
        assert_eq!(dashboard.state().draft(), &submitted);
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error("Failed to add transaction".to_owned()))
        );
    }

    #[test]
    fn delete_removes_transaction() {
        let mut dashboard = Dashboard::new(get_test_store());
        let kept = dashboard
            .add(draft("Cash", "Income", "100", "2024-01-01"))
            .unwrap();
        let deleted = dashboard
            .add(draft("Cash", "Expense", "20", "2024-01-02"))
            .unwrap();

        dashboard.delete(deleted.id).unwrap();

        assert_eq!(dashboard.state().transactions(), &[kept]);
        assert_eq!(dashboard.state().view().total_expenses, 0.0);
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Success("Transaction deleted successfully!".to_owned()))
        );
    }

    #[test]
    fn delete_of_missing_transaction_reports_not_found() {
        let store = CountingStore {
            transactions: vec![Transaction {
                id: 7,
                account: "Cash".to_owned(),
                transaction_type: "Income".to_owned(),
                amount: "1".to_owned(),
                date: "2024-01-01".to_owned(),
            }],
            ..Default::default()
        };
        let mut dashboard = Dashboard::new(store);
        dashboard.load().unwrap();

        let result = dashboard.delete(7);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(dashboard.state().transactions().len(), 1);
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error("Transaction not found".to_owned()))
        );
    }

    #[test]
    fn second_delete_in_flight_is_refused() {
        let store = CountingStore::default();
        let requests = store.requests.clone();
        let mut dashboard = Dashboard::new(store);
        assert!(dashboard.state.begin_delete(3));

        let result = dashboard.delete(3);

        assert_eq!(result, Err(Error::DeleteInProgress));
        assert_eq!(requests.get(), 0);
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error(DELETE_IN_PROGRESS_MESSAGE.to_owned()))
        );
    }

    #[test]
    fn failed_delete_reports_failure() {
        let mut dashboard = Dashboard::new(BrokenStore);

        let result = dashboard.delete(1);

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert_eq!(
            dashboard.state().notice(),
            Some(&Notice::Error("Failed to delete transaction".to_owned()))
        );
    }

    #[test]
    fn range_and_budget_apply_to_loaded_transactions() {
        let mut dashboard = Dashboard::new(get_test_store());
        dashboard
            .add(draft("Bank Account", "Expense", "80", "2024-01-10"))
            .unwrap();
        dashboard
            .add(draft("Bank Account", "Expense", "80", "2024-03-10"))
            .unwrap();

        dashboard.set_budget(Some(100.0));
        assert!(dashboard.state().view().budget_exceeded);

        dashboard.set_date_range(DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 31)));
        assert_eq!(dashboard.state().view().total_expenses, 80.0);
        assert!(!dashboard.state().view().budget_exceeded);
    }
}
