//! Aggregation of expense data for the overview metrics and chart.

use std::collections::HashMap;

use crate::expense::Expense;

/// Sums expense amounts grouped by category.
///
/// Returns (category, total) pairs sorted by total in descending order, ties
/// broken alphabetically so the output is deterministic. An empty input
/// produces an empty vec.
///
/// The sum of the group totals always equals the sum of the amounts in the
/// input.
pub fn aggregate_by_category(expenses: &[Expense]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for expense in expenses {
        *totals.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
    }

    let mut totals: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_string(), total))
        .collect();

    totals.sort_by(|(category_a, total_a), (category_b, total_b)| {
        total_b
            .total_cmp(total_a)
            .then_with(|| category_a.cmp(category_b))
    });

    totals
}

/// The sum of all expense amounts.
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// The category with the largest total, if there is any data.
///
/// `category_totals` must come from [aggregate_by_category]. An empty ledger
/// has no top category; callers should render that as "no data", never as an
/// error.
pub fn top_category(category_totals: &[(String, f64)]) -> Option<&str> {
    category_totals
        .first()
        .map(|(category, _)| category.as_str())
}
