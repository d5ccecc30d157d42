//! Dashboard module
//!
//! Shows the transaction list filtered to a date range, the total expenses
//! against an optional budget, and charts of the filtered totals. The page
//! also has forms for adding and deleting transactions.

mod aggregation;
mod charts;
mod controller;
mod handlers;
mod state;

pub use aggregation::{Account, DateRange, TransactionType};
pub use controller::Dashboard;
pub use handlers::{
    create_dashboard_transaction, delete_dashboard_transaction, get_dashboard_page,
};
pub use state::{
    DashboardAction, DashboardState, DashboardView, LoadTicket, Notice, TransactionDraft,
};
