//! In-memory filtering of expense snapshots.
//!
//! Filtering operates on an already-fetched snapshot rather than in SQL so
//! the month and category option lists can be derived from the same data in
//! one query, and so the predicates stay trivially testable.

use time::Date;

use crate::expense::Expense;

/// Criteria for narrowing down a list of expenses.
///
/// All criteria are optional and compose with logical AND. The predicates
/// are independent, so the order they are applied in does not affect the
/// result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Keep expenses whose date falls in this month, e.g. "2024-03".
    pub month: Option<String>,
    /// Keep expenses with exactly this category.
    pub category: Option<String>,
    /// Keep expenses where this text occurs, case-insensitively, in the note
    /// or the category.
    pub search: Option<String>,
}

impl ExpenseFilter {
    /// Whether `expense` passes every active criterion.
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(month) = &self.month {
            if month_prefix(expense.date) != *month {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if expense.category != *category {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            // An empty note is just a string that never contains the needle,
            // not an error.
            let in_note = expense.note.to_lowercase().contains(&needle);
            let in_category = expense.category.to_lowercase().contains(&needle);

            if !in_note && !in_category {
                return false;
            }
        }

        true
    }
}

/// Return the expenses that pass `filter`, in their original order.
///
/// The input is not modified; matching expenses are cloned into a new vec.
pub fn filter_expenses(expenses: &[Expense], filter: &ExpenseFilter) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| filter.matches(expense))
        .cloned()
        .collect()
}

/// The year-month prefix of a date, e.g. "2024-03".
pub fn month_prefix(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The distinct months present in `expenses`, most recent first.
///
/// Used to populate the month filter dropdown.
pub fn month_options(expenses: &[Expense]) -> Vec<String> {
    let mut months: Vec<String> = expenses
        .iter()
        .map(|expense| month_prefix(expense.date))
        .collect();

    months.sort();
    months.dedup();
    months.reverse();

    months
}

/// The distinct categories present in `expenses`, in alphabetical order.
///
/// Used to populate the category filter dropdown.
pub fn category_options(expenses: &[Expense]) -> Vec<String> {
    let mut categories: Vec<String> = expenses
        .iter()
        .map(|expense| expense.category.clone())
        .collect();

    categories.sort();
    categories.dedup();

    categories
}
