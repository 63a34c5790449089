//! Expense ledger for the tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and `NewExpense` for validated record creation
//! - Database functions for storing, querying, and deleting expenses
//! - Pure filtering and aggregation over expense snapshots
//! - CSV export
//! - View handlers for the expense-related web pages

mod aggregation;
mod chart;
mod core;
mod create_endpoint;
mod csv;
mod delete_all_endpoint;
mod delete_endpoint;
mod delete_selected_endpoint;
mod expenses_page;
mod export_endpoint;
mod filter;
mod new_expense_page;

pub use core::{CategoryName, Expense, ExpenseId, NewExpense, create_expense_table};
pub use create_endpoint::create_expense_endpoint;
pub use delete_all_endpoint::delete_all_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use delete_selected_endpoint::delete_selected_endpoint;
pub use expenses_page::get_expenses_page;
pub use export_endpoint::export_csv_endpoint;
pub use new_expense_page::get_new_expense_page;
