//! The page for recording a new expense.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The categories suggested by the form.
///
/// This is a suggestion list, not a constraint: the ledger accepts any
/// non-empty category.
const SUGGESTED_CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Other",
];

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Route handler for the page with the add expense form.
pub async fn get_new_expense_page(State(state): State<NewExpensePageState>) -> Response {
    let today = match local_today(&state.local_timezone) {
        Some(today) => today,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    new_expense_view(today).into_response()
}

fn new_expense_view(default_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = new_expense_form_view(default_date, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Add Expense", &[], &content)
}

/// Renders the add expense form.
///
/// The create endpoint re-renders this form with an `error_message` when
/// validation fails, so the user sees the warning inline instead of a crash
/// or a blank page.
pub(super) fn new_expense_form_view(default_date: Date, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(default_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    list="category-suggestions"
                    placeholder="Category"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="category-suggestions"
                {
                    @for category in SUGGESTED_CATEGORIES {
                        option value=(category) {}
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount ($)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note (optional)" }

                input
                    id="note"
                    type="text"
                    name="note"
                    placeholder="e.g. lunch with friends"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Expense" }
        }
    }
}

#[cfg(test)]
mod new_expense_page_tests {
    use axum::{extract::State, http::StatusCode, response::Response};
    use scraper::{ElementRef, Html};

    use crate::endpoints;

    use super::{NewExpensePageState, get_new_expense_page};

    #[tokio::test]
    async fn render_page() {
        let state = NewExpensePageState {
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_expense_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .expect("content-type header missing"),
            "text/html; charset=utf-8"
        );

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API);
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "category", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn invalid_timezone_returns_error_page() {
        let state = NewExpensePageState {
            local_timezone: "Not/AZone".to_owned(),
        };

        let response = get_new_expense_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[track_caller]
    fn must_get_form(html: &Html) -> ElementRef<'_> {
        html.select(&scraper::Selector::parse("form").unwrap())
            .next()
            .expect("No form found")
    }

    #[track_caller]
    fn assert_hx_endpoint(form: &ElementRef, endpoint: &str) {
        let hx_post = form
            .value()
            .attr("hx-post")
            .expect("hx-post attribute missing");

        assert_eq!(
            hx_post, endpoint,
            "want form with attribute hx-post=\"{endpoint}\", got {hx_post:?}"
        );
    }

    #[track_caller]
    fn assert_form_input(form: &ElementRef, name: &str, type_: &str) {
        for input in form.select(&scraper::Selector::parse("input").unwrap()) {
            let input_name = input.value().attr("name").unwrap_or_default();

            if input_name == name {
                let input_type = input.value().attr("type").unwrap_or_default();

                assert_eq!(
                    input_type, type_,
                    "want input with type \"{type_}\", got {input_type:?}"
                );

                return;
            }
        }

        panic!("No input found with name \"{name}\" and type \"{type_}\"");
    }

    #[track_caller]
    fn assert_form_submit_button(form: &ElementRef) {
        let submit_button = form
            .select(&scraper::Selector::parse("button").unwrap())
            .next()
            .expect("No button found");

        assert_eq!(
            submit_button.value().attr("type").unwrap_or_default(),
            "submit",
            "want submit button with type=\"submit\""
        );
    }
}
