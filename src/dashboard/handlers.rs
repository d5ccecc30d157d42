//! Dashboard HTTP handlers and view rendering.
//!
//! The page is rendered on the server: every request builds a [Dashboard],
//! loads the transaction list, applies the date range and budget from the
//! query string and then, for the form handlers, adds or deletes a
//! transaction. The page is rendered from the resulting state.

use axum::{
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    dashboard::{
        aggregation::{Account, DateRange, TransactionType, parse_amount, parse_date},
        charts::{
            DashboardChart, accounts_chart, charts_script, charts_view, income_expense_chart,
        },
        controller::Dashboard,
        state::{DashboardState, DashboardView, Notice, TransactionDraft},
    },
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, ECHARTS_URL, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    transaction::SQLiteTransactionStore,
};

/// The date range and budget the dashboard is showing.
///
/// Empty values are treated the same as missing values.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The first day to include, as `YYYY-MM-DD`.
    pub start: Option<String>,
    /// The last day to include, as `YYYY-MM-DD`.
    pub end: Option<String>,
    /// The budget for expenses.
    pub budget: Option<String>,
}

/// The parsed form of [DashboardQuery].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DashboardFilter {
    date_range: DateRange,
    budget: Option<f64>,
}

impl TryFrom<&DashboardQuery> for DashboardFilter {
    type Error = Error;

    fn try_from(query: &DashboardQuery) -> Result<Self, Self::Error> {
        let date_range = DateRange {
            start: parse_optional_date(query.start.as_deref())?,
            end: parse_optional_date(query.end.as_deref())?,
        };

        let budget = match non_empty(query.budget.as_deref()) {
            None => None,
            Some(text) => Some(
                text.parse::<f64>()
                    .ok()
                    .filter(|budget| budget.is_finite())
                    .ok_or_else(|| Error::InvalidBudget(text.to_owned()))?,
            ),
        };

        Ok(Self { date_range, budget })
    }
}

impl DashboardFilter {
    /// The filter as a query string, including the leading '?', or an empty
    /// string if nothing is set.
    fn query_string(&self) -> String {
        let mut pairs = Vec::new();

        if let Some(start) = self.date_range.start {
            pairs.push(format!("start={start}"));
        }

        if let Some(end) = self.date_range.end {
            pairs.push(format!("end={end}"));
        }

        if let Some(budget) = self.budget {
            pairs.push(format!("budget={budget}"));
        }

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

fn parse_optional_date(text: Option<&str>) -> Result<Option<time::Date>, Error> {
    match non_empty(text) {
        None => Ok(None),
        Some(text) => parse_date(text)
            .map(Some)
            .ok_or_else(|| Error::InvalidDate(text.to_owned())),
    }
}

/// Create a dashboard for `filter` and load the transaction list into it.
///
/// Returns the status code to use if the list could not be loaded.
fn load_dashboard(
    store: SQLiteTransactionStore,
    filter: DashboardFilter,
) -> (Dashboard<SQLiteTransactionStore>, Option<StatusCode>) {
    let mut dashboard = Dashboard::new(store);
    dashboard.set_date_range(filter.date_range);
    dashboard.set_budget(filter.budget);

    let failure = dashboard
        .load()
        .err()
        .map(|_| StatusCode::INTERNAL_SERVER_ERROR);

    (dashboard, failure)
}

/// Display a page with the user's transactions, totals and charts.
pub async fn get_dashboard_page(
    State(store): State<SQLiteTransactionStore>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let filter = match DashboardFilter::try_from(&query) {
        Ok(filter) => filter,
        Err(error) => return error.into_page_response(),
    };

    let (dashboard, failure) = load_dashboard(store, filter);
    let status = failure.unwrap_or(StatusCode::OK);

    (status, dashboard_view(dashboard.state(), &filter)).into_response()
}

/// Add a transaction from the dashboard's form and display the updated page.
pub async fn create_dashboard_transaction(
    State(store): State<SQLiteTransactionStore>,
    Query(query): Query<DashboardQuery>,
    Form(draft): Form<TransactionDraft>,
) -> Response {
    let filter = match DashboardFilter::try_from(&query) {
        Ok(filter) => filter,
        Err(error) => return error.into_page_response(),
    };

    let (mut dashboard, failure) = load_dashboard(store, filter);
    if let Some(status) = failure {
        return (status, dashboard_view(dashboard.state(), &filter)).into_response();
    }

    let status = match dashboard.add(draft) {
        Ok(transaction) => {
            tracing::info!("Added transaction {} from the dashboard", transaction.id);
            StatusCode::CREATED
        }
        Err(Error::MissingFields) => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, dashboard_view(dashboard.state(), &filter)).into_response()
}

/// Delete a transaction from the dashboard's table and display the updated page.
pub async fn delete_dashboard_transaction(
    State(store): State<SQLiteTransactionStore>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let Ok(Path(transaction_id)) = transaction_id else {
        return Error::NotFound.into_page_response();
    };

    let filter = match DashboardFilter::try_from(&query) {
        Ok(filter) => filter,
        Err(error) => return error.into_page_response(),
    };

    let (mut dashboard, failure) = load_dashboard(store, filter);
    if let Some(status) = failure {
        return (status, dashboard_view(dashboard.state(), &filter)).into_response();
    }

    let status = match dashboard.delete(transaction_id) {
        Ok(()) => StatusCode::OK,
        Err(Error::NotFound) => StatusCode::NOT_FOUND,
        Err(Error::DeleteInProgress) => StatusCode::CONFLICT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, dashboard_view(dashboard.state(), &filter)).into_response()
}

fn build_dashboard_charts(view: &DashboardView) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "accounts-chart",
            options: accounts_chart(&view.account_totals).to_string(),
        },
        DashboardChart {
            id: "income-expense-chart",
            options: income_expense_chart(&view.income_expense_totals).to_string(),
        },
    ]
}

fn dashboard_view(state: &DashboardState, filter: &DashboardFilter) -> Markup {
    let view = state.view();
    let charts = build_dashboard_charts(view);
    let query_string = filter.query_string();

    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Wallet Dashboard" }

            @if let Some(notice) = state.notice() {
                (notice_view(notice))
            }

            (filter_form_view(filter))
            (summary_view(view, filter.budget))
            (add_transaction_form_view(state.draft(), &query_string))
            (transactions_table_view(view, &query_string))
            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn notice_view(notice: &Notice) -> Markup {
    let (class, message) = match notice {
        Notice::Success(message) => ("text-green-700 bg-green-100", message),
        Notice::Error(message) => ("text-red-700 bg-red-100", message),
    };

    html!(
        div
            id="notice"
            role="alert"
            class={ "w-full max-w-md p-4 mb-4 rounded " (class) }
        {
            (message)
        }
    )
}

fn filter_form_view(filter: &DashboardFilter) -> Markup {
    let start = filter.date_range.start.map(|date| date.to_string());
    let end = filter.date_range.end.map(|date| date.to_string());
    let budget = filter.budget.map(|budget| budget.to_string());

    html!(
        form
            id="filter-form"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full grid grid-cols-1 md:grid-cols-4 gap-4 mb-4 items-end"
        {
            div
            {
                label for="start" class=(FORM_LABEL_STYLE) { "Start Date" }
                input type="date" name="start" id="start" value=[start]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end" class=(FORM_LABEL_STYLE) { "End Date" }
                input type="date" name="end" id="end" value=[end]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="budget" class=(FORM_LABEL_STYLE) { "Budget" }
                input type="number" name="budget" id="budget" step="0.01" value=[budget]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

fn summary_view(view: &DashboardView, budget: Option<f64>) -> Markup {
    let total_expenses = format_currency(view.total_expenses);

    html!(
        section id="summary" class="w-full mb-4"
        {
            p { "Total Expenses: " span id="total-expenses" { (total_expenses) } }

            @if let Some(budget) = budget {
                p { "Budget: " (format_currency(budget)) }

                @if view.budget_exceeded {
                    p id="budget-warning" role="alert" class="text-red-600 font-semibold"
                    {
                        "Your total expenses (" (total_expenses) ") exceed your budget ("
                        (format_currency(budget)) ")!"
                    }
                }
            }
        }
    )
}

fn add_transaction_form_view(draft: &TransactionDraft, query_string: &str) -> Markup {
    let action = format!("{}{}", endpoints::DASHBOARD_TRANSACTIONS, query_string);

    html!(
        form
            id="add-transaction-form"
            method="post"
            action=(action)
            class="w-full grid grid-cols-1 md:grid-cols-5 gap-4 mb-4 items-end"
        {
            div
            {
                label for="account" class=(FORM_LABEL_STYLE) { "Account" }
                select name="account" id="account" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[draft.account.is_empty()] { "Select Account" }
                    @for account in Account::ALL {
                        option value=(account.label()) selected[draft.account == account.label()]
                        {
                            (account.label())
                        }
                    }
                }
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[draft.transaction_type.is_empty()] { "Select Type" }
                    @for transaction_type in TransactionType::ALL {
                        option
                            value=(transaction_type.label())
                            selected[draft.transaction_type == transaction_type.label()]
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input type="number" name="amount" id="amount" step="0.01"
                    value=(draft.amount) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input type="date" name="date" id="date"
                    value=(draft.date) class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    )
}

fn transactions_table_view(view: &DashboardView, query_string: &str) -> Markup {
    html!(
        div class="w-full overflow-x-auto mb-4"
        {
            table id="transactions-table" class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for transaction in &view.filtered {
                        @let delete_url = format!(
                            "{}{}",
                            format_endpoint(
                                endpoints::DASHBOARD_DELETE_TRANSACTION,
                                transaction.id
                            ),
                            query_string
                        );

                        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.account) }
                            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (format_currency(parse_amount(&transaction.amount)))
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.date) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                form method="post" action=(delete_url)
                                {
                                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                                }
                            }
                        }
                    }

                    @if view.filtered.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class={ (TABLE_CELL_STYLE) " text-center" }
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    )
}
