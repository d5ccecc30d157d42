//! Transaction filtering and aggregation for the dashboard.
//!
//! Every function here is pure: it takes the transactions it needs and
//! returns freshly computed totals, so the dashboard can recompute its whole
//! view from scratch after any change.

use time::{Date, macros::format_description};

use crate::transaction::Transaction;

/// The accounts the dashboard knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Account {
    /// A bank account.
    BankAccount,
    /// A mobile money wallet.
    MobileMoneyAccount,
    /// Physical cash.
    Cash,
}

impl Account {
    /// Every account in the order it is displayed.
    pub const ALL: [Account; 3] = [
        Account::BankAccount,
        Account::MobileMoneyAccount,
        Account::Cash,
    ];

    /// The name of the account as it is stored on a transaction.
    pub fn label(self) -> &'static str {
        match self {
            Account::BankAccount => "Bank Account",
            Account::MobileMoneyAccount => "Mobile Money Account",
            Account::Cash => "Cash",
        }
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// Every transaction type in the order it is displayed.
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    /// The name of the type as it is stored on a transaction.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

/// An inclusive range of dates used to filter transactions.
///
/// The range only filters when both bounds are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// The first day to include.
    pub start: Option<Date>,
    /// The last day to include.
    pub end: Option<Date>,
}

impl DateRange {
    /// Create a range that includes `start` and `end`.
    pub fn new(start: Date, end: Date) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The bounds of the range, if both are set.
    pub fn bounds(&self) -> Option<(Date, Date)> {
        self.start.zip(self.end)
    }
}

/// Parse a `YYYY-MM-DD` string as a calendar date.
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Parse a stored amount as a number.
///
/// The store accepts any non-empty text as an amount, so text that is not a
/// number counts as zero.
pub fn parse_amount(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Select the transactions that happened within `range`.
///
/// If either bound is unset, every transaction is returned. Otherwise only
/// transactions whose date parses and falls within the bounds are returned,
/// in their original order.
pub fn filter_by_date_range(transactions: &[Transaction], range: DateRange) -> Vec<Transaction> {
    let Some((start, end)) = range.bounds() else {
        return transactions.to_vec();
    };

    transactions
        .iter()
        .filter(|transaction| {
            parse_date(&transaction.date).is_some_and(|date| start <= date && date <= end)
        })
        .cloned()
        .collect()
}

/// Sum the amounts of the transactions that match `predicate`.
fn sum_where(transactions: &[Transaction], predicate: impl Fn(&Transaction) -> bool) -> f64 {
    transactions
        .iter()
        .filter(|transaction| predicate(transaction))
        .map(|transaction| parse_amount(&transaction.amount))
        .sum()
}

/// The sum of the amounts of every "Expense" transaction.
pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    sum_where(transactions, |transaction| {
        transaction.transaction_type == TransactionType::Expense.label()
    })
}

/// Whether `total_expenses` is strictly greater than `budget`.
///
/// No budget is never exceeded.
pub fn is_budget_exceeded(total_expenses: f64, budget: Option<f64>) -> bool {
    budget.is_some_and(|budget| total_expenses > budget)
}

/// The total amount for each known account.
///
/// Transactions for any other account are ignored.
pub fn account_totals(transactions: &[Transaction]) -> Vec<(Account, f64)> {
    Account::ALL
        .into_iter()
        .map(|account| {
            let total = sum_where(transactions, |transaction| {
                transaction.account == account.label()
            });
            (account, total)
        })
        .collect()
}

/// The total amount for each known transaction type.
///
/// Transactions with any other type are ignored.
pub fn income_expense_totals(transactions: &[Transaction]) -> Vec<(TransactionType, f64)> {
    TransactionType::ALL
        .into_iter()
        .map(|transaction_type| {
            let total = sum_where(transactions, |transaction| {
                transaction.transaction_type == transaction_type.label()
            });
            (transaction_type, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        dashboard::aggregation::{
            Account, DateRange, TransactionType, account_totals, filter_by_date_range,
            income_expense_totals, is_budget_exceeded, parse_amount, parse_date, total_expenses,
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

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            transaction(1, "Cash", "Income", "100", "2024-01-01"),
            transaction(2, "Bank Account", "Expense", "40.5", "2024-01-15"),
            transaction(3, "Mobile Money Account", "Expense", "9.5", "2024-01-31"),
            transaction(4, "Cash", "Expense", "20", "2024-02-01"),
        ]
    }

    #[test]
    fn parses_dates() {
        assert_eq!(parse_date("2024-02-29"), Some(date!(2024 - 02 - 29)));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("01/02/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn non_numeric_amount_counts_as_zero() {
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount(" 7 "), 7.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn unset_range_keeps_every_transaction() {
        let transactions = sample_transactions();

        assert_eq!(
            filter_by_date_range(&transactions, DateRange::default()),
            transactions
        );

        let half_open = DateRange {
            start: Some(date!(2024 - 01 - 10)),
            end: None,
        };
        assert_eq!(filter_by_date_range(&transactions, half_open), transactions);
    }

    #[test]
    fn range_is_inclusive() {
        let transactions = sample_transactions();
        let range = DateRange::new(date!(2024 - 01 - 15), date!(2024 - 01 - 31));

        let filtered = filter_by_date_range(&transactions, range);

        let ids: Vec<_> = filtered.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn range_spans_years() {
        let transactions = vec![
            transaction(1, "Cash", "Expense", "1", "2023-12-30"),
            transaction(2, "Cash", "Expense", "1", "2023-12-31"),
            transaction(3, "Cash", "Expense", "1", "2024-01-01"),
            transaction(4, "Cash", "Expense", "1", "2024-01-02"),
        ];
        let range = DateRange::new(date!(2023 - 12 - 31), date!(2024 - 01 - 01));

        let filtered = filter_by_date_range(&transactions, range);

        let ids: Vec<_> = filtered.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn unparseable_dates_are_excluded_from_a_set_range() {
        let transactions = vec![transaction(1, "Cash", "Expense", "1", "yesterday")];
        let range = DateRange::new(date!(2000 - 01 - 01), date!(2100 - 01 - 01));

        assert!(filter_by_date_range(&transactions, range).is_empty());
    }

    #[test]
    fn total_expenses_only_counts_expenses() {
        let mut transactions = sample_transactions();
        transactions.push(transaction(5, "Cash", "expense", "1000", "2024-02-02"));

        assert_eq!(total_expenses(&transactions), 70.0);
    }

    #[test]
    fn total_expenses_of_nothing_is_zero() {
        assert_eq!(total_expenses(&[]), 0.0);
    }

    #[test]
    fn budget_exceeded_is_strict() {
        assert!(is_budget_exceeded(100.01, Some(100.0)));
        assert!(!is_budget_exceeded(100.0, Some(100.0)));
        assert!(!is_budget_exceeded(99.0, Some(100.0)));
        assert!(!is_budget_exceeded(1_000_000.0, None));
    }

    #[test]
    fn account_totals_ignore_unknown_accounts() {
        let mut transactions = sample_transactions();
        transactions.push(transaction(5, "Piggy Bank", "Income", "1000", "2024-02-02"));

        assert_eq!(
            account_totals(&transactions),
            vec![
                (Account::BankAccount, 40.5),
                (Account::MobileMoneyAccount, 9.5),
                (Account::Cash, 120.0),
            ]
        );
    }

    #[test]
    fn income_expense_totals_ignore_unknown_types() {
        let mut transactions = sample_transactions();
        transactions.push(transaction(5, "Cash", "Transfer", "1000", "2024-02-02"));

        assert_eq!(
            income_expense_totals(&transactions),
            vec![(TransactionType::Income, 100.0), (TransactionType::Expense, 70.0)]
        );
    }
}
