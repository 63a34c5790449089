//! The expenses overview page: filters, summary metrics, the ledger table,
//! the spending breakdown chart, and the delete/export controls.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    expense::{
        Expense,
        aggregation::{aggregate_by_category, top_category, total_spent},
        chart::{LedgerChart, chart_script, spending_breakdown_chart},
        core::get_all_expenses,
        filter::{ExpenseFilter, category_options, filter_expenses, month_options},
    },
    html::{
        BUTTON_DELETE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
};

/// The value of a filter dropdown that disables that filter.
const ALL_OPTION: &str = "All";

/// The filter controls as they appear in the page's query string.
///
/// `"All"` and empty values mean "no filter"; [FilterParams::to_filter]
/// normalizes them away.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// The selected month, e.g. "2024-03", or "All".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// The selected category, or "All".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free text to search for in notes and categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterParams {
    /// Convert the raw query parameters into filter criteria, dropping the
    /// "All" sentinel and empty strings.
    pub fn to_filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            month: normalize(&self.month),
            category: normalize(&self.category),
            search: normalize(&self.search),
        }
    }
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ALL_OPTION)
        .map(ToOwned::to_owned)
}

/// Build the query string for links that should keep the active filter.
///
/// Returns an empty string when no filter is active.
pub(super) fn filter_query_string(params: &FilterParams) -> String {
    serde_urlencoded::to_string(params).unwrap_or_else(|error| {
        tracing::error!("Could not encode filter params: {error}");
        String::new()
    })
}

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the expense ledger with the active filter applied.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(&connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW);

    if expenses.is_empty() {
        return Ok(expenses_no_data_view(nav_bar).into_response());
    }

    let filtered = filter_expenses(&expenses, &params.to_filter());
    let months = month_options(&expenses);
    let categories = category_options(&expenses);

    Ok(expenses_view(nav_bar, &params, &months, &categories, &filtered).into_response())
}

/// Renders the expenses page when the ledger is empty.
fn expenses_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your ledger is empty. "
                a
                    href=(endpoints::NEW_EXPENSE_VIEW)
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400 underline"
                {
                    "Add your first expense"
                }
                " to get started."
            }
        }
    );

    base("Expenses", &[], &content)
}

/// Renders the full expenses page: filter bar, metrics, table, chart and
/// management controls.
fn expenses_view(
    nav_bar: NavBar,
    params: &FilterParams,
    months: &[String],
    categories: &[String],
    filtered: &[Expense],
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let category_totals = aggregate_by_category(filtered);

    let charts = [LedgerChart {
        id: "spending-breakdown-chart",
        options: spending_breakdown_chart(&category_totals).to_string(),
    }];

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (filter_form_view(params, months, categories))

            @if filtered.is_empty() {
                p class="my-8"
                {
                    "No expenses match the current filter."
                }
            } @else {
                (metrics_view(filtered, &category_totals))
                (expenses_table_view(params, filtered))

                section id="spending-breakdown" class="w-full mx-auto mb-4"
                {
                    div
                        id="spending-breakdown-chart"
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }

            (manage_view())
        }
    );

    // The chart container only exists when there is data to plot, so the
    // init script is only included then.
    let scripts = if filtered.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(
                "https://cdn.jsdelivr.net/npm/echarts@5.5.1/dist/echarts.min.js".to_owned(),
            ),
            chart_script(&charts),
        ]
    };

    base("Expenses", &scripts, &content)
}

/// Renders the month/category/search filter bar.
///
/// The form submits with GET so the filter lives in the URL and survives
/// reloads and the post-delete redirect.
fn filter_form_view(params: &FilterParams, months: &[String], categories: &[String]) -> Markup {
    let selected_month = params.month.as_deref().unwrap_or(ALL_OPTION);
    let selected_category = params.category.as_deref().unwrap_or(ALL_OPTION);
    let search = params.search.as_deref().unwrap_or_default();

    html!(
        form
            method="get"
            action=(endpoints::EXPENSES_VIEW)
            class="w-full flex flex-col md:flex-row gap-4 items-end
                bg-gray-50 dark:bg-gray-800 p-4 rounded-lg mb-4"
        {
            div class="flex-1"
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value=(ALL_OPTION) selected[selected_month == ALL_OPTION] { (ALL_OPTION) }

                    @for month in months {
                        option value=(month) selected[selected_month == month.as_str()] { (month) }
                    }
                }
            }

            div class="flex-1"
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value=(ALL_OPTION) selected[selected_category == ALL_OPTION] { (ALL_OPTION) }

                    @for category in categories {
                        option value=(category) selected[selected_category == category.as_str()] { (category) }
                    }
                }
            }

            div class="flex-1"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search notes / category" }

                input
                    id="search"
                    type="text"
                    name="search"
                    value=(search)
                    placeholder="e.g. lunch"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Apply"
            }
        }
    )
}

/// Renders the summary metric cards for the filtered expenses.
fn metrics_view(filtered: &[Expense], category_totals: &[(String, f64)]) -> Markup {
    let total = total_spent(filtered);
    let top = top_category(category_totals).unwrap_or("—");

    html!(
        section class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-4"
        {
            (metric_card("Total Spent", &format_currency(total)))
            (metric_card("Transactions", &filtered.len().to_string()))
            (metric_card("Top Category", top))
        }
    )
}

fn metric_card(label: &str, value: &str) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-4"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class="text-2xl font-semibold" { (value) }
        }
    )
}

/// Renders the ledger table wrapped in the multi-select delete form, plus the
/// export link for the current filter.
fn expenses_table_view(params: &FilterParams, filtered: &[Expense]) -> Markup {
    let query = filter_query_string(params);
    let export_url = if query.is_empty() {
        endpoints::EXPORT_CSV.to_owned()
    } else {
        format!("{}?{}", endpoints::EXPORT_CSV, query)
    };

    html!(
        section class="w-full mb-4"
        {
            form
                hx-post=(endpoints::DELETE_SELECTED)
                hx-confirm="Delete the selected expenses?"
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                hx-swap="innerHTML"
            {
                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class="px-6 py-3" { "Select" }
                                th scope="col" class="px-6 py-3" { "ID" }
                                th scope="col" class="px-6 py-3" { "Date" }
                                th scope="col" class="px-6 py-3" { "Category" }
                                th scope="col" class="px-6 py-3" { "Amount" }
                                th scope="col" class="px-6 py-3" { "Note" }
                                th scope="col" class="px-6 py-3" { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for expense in filtered {
                                (expense_row_view(expense))
                            }
                        }
                    }
                }

                div class="flex flex-wrap gap-4 mt-4"
                {
                    button
                        type="submit"
                        class="px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded"
                    {
                        "Delete selected"
                    }

                    a
                        href=(export_url)
                        download="expenses.csv"
                        class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                            hover:dark:bg-blue-700 text-white rounded"
                    {
                        "Download filtered CSV"
                    }
                }
            }
        }
    )
}

/// Renders one table row with its selection checkbox and delete button.
fn expense_row_view(expense: &Expense) -> Markup {
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    name="selected"
                    value=(expense.id)
                    aria-label=(format!("Select expense {}", expense.id))
                    class="rounded-sm border-gray-300 text-blue-600";
            }

            td class=(TABLE_CELL_STYLE) { (expense.id) }
            td class=(TABLE_CELL_STYLE) { (expense.date) }
            td class=(TABLE_CELL_STYLE) { (expense.category) }
            td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount)) }
            td class=(TABLE_CELL_STYLE) { (expense.note) }

            td class=(TABLE_CELL_STYLE)
            {
                // type="button" so the delete does not submit the
                // surrounding multi-select form.
                button
                    type="button"
                    hx-delete=(delete_endpoint)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    )
}

/// Renders the management controls that affect the entire ledger.
fn manage_view() -> Markup {
    html!(
        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Manage" }

            button
                hx-post=(endpoints::DELETE_ALL)
                hx-confirm="Delete ALL expenses? This cannot be undone."
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                hx-swap="innerHTML"
                class="px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded"
            {
                "Delete all expenses"
            }
        }
    )
}

#[cfg(test)]
mod filter_params_tests {
    use crate::expense::filter::ExpenseFilter;

    use super::{FilterParams, filter_query_string};

    #[test]
    fn all_sentinel_and_empty_strings_mean_no_filter() {
        let params = FilterParams {
            month: Some("All".to_string()),
            category: Some("".to_string()),
            search: Some("  ".to_string()),
        };

        assert_eq!(params.to_filter(), ExpenseFilter::default());
    }

    #[test]
    fn values_pass_through() {
        let params = FilterParams {
            month: Some("2024-03".to_string()),
            category: Some("Food".to_string()),
            search: Some("lunch".to_string()),
        };

        assert_eq!(
            params.to_filter(),
            ExpenseFilter {
                month: Some("2024-03".to_string()),
                category: Some("Food".to_string()),
                search: Some("lunch".to_string()),
            }
        );
    }

    #[test]
    fn query_string_skips_missing_fields() {
        let params = FilterParams {
            month: Some("2024-03".to_string()),
            category: None,
            search: None,
        };

        assert_eq!(filter_query_string(&params), "month=2024-03");
    }

    #[test]
    fn query_string_is_empty_without_filters() {
        assert_eq!(filter_query_string(&FilterParams::default()), "");
    }
}
