//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}',
//! use [format_endpoint].

/// The root route which redirects to the expenses page.
pub const ROOT: &str = "/";
/// The page displaying the expense ledger: filters, metrics, table and chart.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to delete a single expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to delete the expenses selected in the ledger table.
pub const DELETE_SELECTED: &str = "/api/expenses/delete";
/// The route to delete every expense in the ledger.
pub const DELETE_ALL: &str = "/api/expenses/delete-all";
/// The route to download expenses as a CSV file.
pub const EXPORT_CSV: &str = "/api/expenses/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}',
/// '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
