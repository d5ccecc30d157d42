//! The dashboard's state container.
//!
//! [DashboardState] holds the canonical transaction list, the user's date
//! range and budget, the add transaction draft and the latest notice. It is
//! only changed through [DashboardAction]s, and every action re-derives the
//! whole [DashboardView] with [derive], so the filtered list, the totals, the
//! budget warning and the chart series can never disagree with each other.

use std::collections::HashSet;

use serde::Deserialize;

use crate::{
    Error,
    dashboard::aggregation::{
        Account, DateRange, TransactionType, account_totals, filter_by_date_range,
        income_expense_totals, is_budget_exceeded, total_expenses,
    },
    database_id::TransactionId,
    transaction::{NewTransaction, Transaction},
};

/// The message shown when the add transaction form is incomplete.
pub const INCOMPLETE_DRAFT_MESSAGE: &str = "Please fill in all fields.";

/// The add transaction form as the user has filled it in so far.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionDraft {
    /// The selected account.
    #[serde(default)]
    pub account: String,
    /// The selected transaction type.
    #[serde(default, rename = "type")]
    pub transaction_type: String,
    /// The amount as typed.
    #[serde(default)]
    pub amount: String,
    /// The date as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
}

impl TransactionDraft {
    /// Check that every field has been filled in.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if any field is empty.
    pub fn validate(&self) -> Result<NewTransaction, Error> {
        NewTransaction::new(
            self.account.as_str(),
            self.transaction_type.as_str(),
            self.amount.as_str(),
            self.date.as_str(),
        )
    }
}

/// A message for the user about the outcome of their last action.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The action succeeded.
    Success(String),
    /// The action failed.
    Error(String),
}

/// Identifies a request to load the transaction list.
///
/// Only the response to the most recently issued ticket is applied, so a slow
/// response cannot overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Everything the dashboard displays that is computed from the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    /// The transactions within the date range.
    pub filtered: Vec<Transaction>,
    /// The sum of the filtered expenses.
    pub total_expenses: f64,
    /// Whether `total_expenses` is over the budget.
    pub budget_exceeded: bool,
    /// The filtered totals for each known account.
    pub account_totals: Vec<(Account, f64)>,
    /// The filtered totals for income and expenses.
    pub income_expense_totals: Vec<(TransactionType, f64)>,
}

/// Compute the dashboard view from scratch.
pub fn derive(
    transactions: &[Transaction],
    range: DateRange,
    budget: Option<f64>,
) -> DashboardView {
    let filtered = filter_by_date_range(transactions, range);
    let total_expenses = total_expenses(&filtered);

    DashboardView {
        budget_exceeded: is_budget_exceeded(total_expenses, budget),
        account_totals: account_totals(&filtered),
        income_expense_totals: income_expense_totals(&filtered),
        total_expenses,
        filtered,
    }
}

/// The changes that can be made to a [DashboardState].
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    /// The transaction list was fetched.
    Loaded {
        /// The ticket from [DashboardState::begin_load].
        ticket: LoadTicket,
        /// Every stored transaction.
        transactions: Vec<Transaction>,
    },
    /// The transaction list could not be fetched.
    LoadFailed {
        /// The ticket from [DashboardState::begin_load].
        ticket: LoadTicket,
        /// The message to show the user.
        message: String,
    },
    /// The user changed the date range.
    SetDateRange(DateRange),
    /// The user changed or cleared the budget.
    SetBudget(Option<f64>),
    /// The user edited the add transaction form.
    EditDraft(TransactionDraft),
    /// The add transaction form was submitted with a missing field.
    DraftRejected,
    /// The store created the drafted transaction.
    TransactionCreated {
        /// The stored transaction with its assigned ID.
        transaction: Transaction,
        /// The message from the store.
        message: String,
    },
    /// The store could not create the drafted transaction.
    CreateFailed(String),
    /// The store deleted a transaction.
    TransactionDeleted {
        /// The ID of the deleted transaction.
        id: TransactionId,
        /// The message from the store.
        message: String,
    },
    /// A delete was not sent because one for the same ID is already in flight.
    DeleteRefused {
        /// The message to show the user.
        message: String,
    },
    /// The store could not delete a transaction.
    DeleteFailed {
        /// The ID of the transaction that was not deleted.
        id: TransactionId,
        /// The message to show the user.
        message: String,
    },
}

/// The state behind the dashboard page.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    transactions: Vec<Transaction>,
    date_range: DateRange,
    budget: Option<f64>,
    draft: TransactionDraft,
    notice: Option<Notice>,
    view: DashboardView,
    latest_load: u64,
    pending_deletes: HashSet<TransactionId>,
}

impl DashboardState {
    /// Create an empty dashboard with no date range or budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for the transaction list.
    ///
    /// Any ticket issued before this one becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        LoadTicket(self.latest_load)
    }

    /// Start a request to delete the transaction `id`.
    ///
    /// Returns `false` if a delete for `id` is already in flight, in which
    /// case the caller should not send another request.
    pub fn begin_delete(&mut self, id: TransactionId) -> bool {
        self.pending_deletes.insert(id)
    }

    /// Apply `action` and re-derive the view.
    pub fn apply(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Loaded {
                ticket,
                transactions,
            } => {
                if !self.is_latest(ticket) {
                    tracing::debug!("Ignoring stale transaction list {ticket:?}");
                    return;
                }

                self.transactions = transactions;
            }
            DashboardAction::LoadFailed { ticket, message } => {
                if !self.is_latest(ticket) {
                    tracing::debug!("Ignoring stale load failure {ticket:?}");
                    return;
                }

                self.notice = Some(Notice::Error(message));
            }
            DashboardAction::SetDateRange(date_range) => self.date_range = date_range,
            DashboardAction::SetBudget(budget) => self.budget = budget,
            DashboardAction::EditDraft(draft) => self.draft = draft,
            DashboardAction::DraftRejected => {
                self.notice = Some(Notice::Error(INCOMPLETE_DRAFT_MESSAGE.to_owned()));
            }
            DashboardAction::TransactionCreated {
                transaction,
                message,
            } => {
                self.transactions.push(transaction);
                self.draft = TransactionDraft::default();
                self.notice = Some(Notice::Success(message));
            }
            DashboardAction::CreateFailed(message) => {
                self.notice = Some(Notice::Error(message));
            }
            DashboardAction::TransactionDeleted { id, message } => {
                self.pending_deletes.remove(&id);
                self.transactions.retain(|transaction| transaction.id != id);
                self.notice = Some(Notice::Success(message));
            }
            DashboardAction::DeleteRefused { message } => {
                self.notice = Some(Notice::Error(message));
            }
            DashboardAction::DeleteFailed { id, message } => {
                self.pending_deletes.remove(&id);
                self.notice = Some(Notice::Error(message));
            }
        }

        self.view = derive(&self.transactions, self.date_range, self.budget);
    }

    fn is_latest(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest_load
    }

    /// Every transaction, regardless of the date range.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The date range used to filter transactions.
    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// The user's budget for expenses.
    pub fn budget(&self) -> Option<f64> {
        self.budget
    }

    /// The add transaction form.
    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    /// The outcome of the last action, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The derived view.
    pub fn view(&self) -> &DashboardView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        dashboard::{
            aggregation::{Account, DateRange, TransactionType},
            state::{
                DashboardAction, DashboardState, INCOMPLETE_DRAFT_MESSAGE, Notice,
                TransactionDraft,
            },
        },
        transaction::Transaction,
    };

    fn transaction(
        id: i64,
        account: &str,
        transaction_type: &str,
        amount: &str,
        date: &str,
    ) -> Transaction {
        Transaction {
            id,
            account: account.to_owned(),
            transaction_type: transaction_type.to_owned(),
            amount: amount.to_owned(),
            date: date.to_owned(),
        }
    }

    fn loaded_state(transactions: Vec<Transaction>) -> DashboardState {
        let mut state = DashboardState::new();
        let ticket = state.begin_load();
        state.apply(DashboardAction::Loaded {
            ticket,
            transactions,
        });
        state
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            transaction(1, "Cash", "Income", "100", "2024-01-01"),
            transaction(2, "Bank Account", "Expense", "60", "2024-01-10"),
            transaction(3, "Cash", "Expense", "50", "2024-02-10"),
        ]
    }

    #[test]
    fn new_state_is_empty() {
        let state = DashboardState::new();

        assert!(state.transactions().is_empty());
        assert!(state.view().filtered.is_empty());
        assert_eq!(state.view().total_expenses, 0.0);
        assert!(!state.view().budget_exceeded);
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn load_derives_view_from_full_list() {
        let state = loaded_state(sample_transactions());

        assert_eq!(state.view().filtered, sample_transactions());
        assert_eq!(state.view().total_expenses, 110.0);
        assert_eq!(
            state.view().income_expense_totals,
            vec![(TransactionType::Income, 100.0), (TransactionType::Expense, 110.0)]
        );
        assert_eq!(
            state.view().account_totals,
            vec![
                (Account::BankAccount, 60.0),
                (Account::MobileMoneyAccount, 0.0),
                (Account::Cash, 150.0),
            ]
        );
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut state = DashboardState::new();
        let stale = state.begin_load();
        let latest = state.begin_load();

        state.apply(DashboardAction::Loaded {
            ticket: latest,
            transactions: sample_transactions(),
        });
        state.apply(DashboardAction::Loaded {
            ticket: stale,
            transactions: vec![],
        });

        assert_eq!(state.transactions(), sample_transactions().as_slice());
    }

    #[test]
    fn load_failure_leaves_list_empty_and_sets_notice() {
        let mut state = DashboardState::new();
        let ticket = state.begin_load();

        state.apply(DashboardAction::LoadFailed {
            ticket,
            message: "Could not load transactions".to_owned(),
        });

        assert!(state.transactions().is_empty());
        assert_eq!(
            state.notice(),
            Some(&Notice::Error("Could not load transactions".to_owned()))
        );
    }

    #[test]
    fn date_range_filters_and_recomputes_totals() {
        let mut state = loaded_state(sample_transactions());

        state.apply(DashboardAction::SetDateRange(DateRange::new(
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 31),
        )));

        let ids: Vec<_> = state.view().filtered.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(state.view().total_expenses, 60.0);
        assert_eq!(
            state.view().account_totals,
            vec![
                (Account::BankAccount, 60.0),
                (Account::MobileMoneyAccount, 0.0),
                (Account::Cash, 100.0),
            ]
        );
    }

    #[test]
    fn clearing_date_range_restores_full_list() {
        let mut state = loaded_state(sample_transactions());
        state.apply(DashboardAction::SetDateRange(DateRange::new(
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 31),
        )));

        state.apply(DashboardAction::SetDateRange(DateRange::default()));

        assert_eq!(state.view().filtered, sample_transactions());
    }

    #[test]
    fn budget_change_rechecks_current_total() {
        let mut state = loaded_state(sample_transactions());

        state.apply(DashboardAction::SetBudget(Some(100.0)));
        assert!(state.view().budget_exceeded);

        state.apply(DashboardAction::SetBudget(Some(110.0)));
        assert!(!state.view().budget_exceeded, "equal to budget is not exceeded");

        state.apply(DashboardAction::SetBudget(None));
        assert!(!state.view().budget_exceeded);
    }

    #[test]
    fn range_change_rechecks_budget() {
        let mut state = loaded_state(sample_transactions());
        state.apply(DashboardAction::SetBudget(Some(100.0)));
        assert!(state.view().budget_exceeded);

        state.apply(DashboardAction::SetDateRange(DateRange::new(
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 28),
        )));

        assert_eq!(state.view().total_expenses, 50.0);
        assert!(!state.view().budget_exceeded);
    }

    #[test]
    fn created_transaction_is_appended_and_draft_cleared() {
        let mut state = loaded_state(sample_transactions());
        state.apply(DashboardAction::SetBudget(Some(150.0)));
        state.apply(DashboardAction::EditDraft(TransactionDraft {
            account: "Mobile Money Account".to_owned(),
            transaction_type: "Expense".to_owned(),
            amount: "45".to_owned(),
            date: "2024-02-11".to_owned(),
        }));

        state.apply(DashboardAction::TransactionCreated {
            transaction: transaction(4, "Mobile Money Account", "Expense", "45", "2024-02-11"),
            message: "Transaction added successfully!".to_owned(),
        });

        assert_eq!(state.transactions().len(), 4);
        assert_eq!(state.transactions()[3].id, 4);
        assert_eq!(state.draft(), &TransactionDraft::default());
        assert_eq!(state.view().total_expenses, 155.0);
        assert!(state.view().budget_exceeded);
        assert_eq!(
            state.notice(),
            Some(&Notice::Success("Transaction added successfully!".to_owned()))
        );
    }

    #[test]
    fn rejected_draft_is_kept() {
        let draft = TransactionDraft {
            account: "Cash".to_owned(),
            ..Default::default()
        };
        let mut state = DashboardState::new();
        state.apply(DashboardAction::EditDraft(draft.clone()));

        state.apply(DashboardAction::DraftRejected);

        assert_eq!(state.draft(), &draft);
        assert_eq!(
            state.notice(),
            Some(&Notice::Error(INCOMPLETE_DRAFT_MESSAGE.to_owned()))
        );
    }

    #[test]
    fn failed_create_leaves_list_unchanged() {
        let mut state = loaded_state(sample_transactions());

        state.apply(DashboardAction::CreateFailed("Failed to add transaction".to_owned()));

        assert_eq!(state.transactions(), sample_transactions().as_slice());
        assert_eq!(
            state.notice(),
            Some(&Notice::Error("Failed to add transaction".to_owned()))
        );
    }

    #[test]
    fn deleted_transaction_is_removed_by_id() {
        let mut state = loaded_state(sample_transactions());
        assert!(state.begin_delete(2));

        state.apply(DashboardAction::TransactionDeleted {
            id: 2,
            message: "Transaction deleted successfully!".to_owned(),
        });

        let ids: Vec<_> = state.transactions().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(state.view().total_expenses, 50.0);
    }

    #[test]
    fn concurrent_delete_of_same_id_is_refused() {
        let mut state = loaded_state(sample_transactions());

        assert!(state.begin_delete(2));
        assert!(!state.begin_delete(2));
        assert!(state.begin_delete(3));

        state.apply(DashboardAction::DeleteFailed {
            id: 2,
            message: "Failed to delete transaction".to_owned(),
        });

        assert!(state.begin_delete(2), "a failed delete can be retried");
        assert_eq!(state.transactions(), sample_transactions().as_slice());
    }

    #[test]
    fn draft_validation() {
        let complete = TransactionDraft {
            account: "Cash".to_owned(),
            transaction_type: "Income".to_owned(),
            amount: "100".to_owned(),
            date: "2024-01-01".to_owned(),
        };
        assert!(complete.validate().is_ok());

        let missing_date = TransactionDraft {
            date: String::new(),
            ..complete
        };
        assert_eq!(missing_date.validate(), Err(Error::MissingFields));
    }
}
