//! Defines the endpoint for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    expense::{
        CategoryName, NewExpense, core::create_expense,
        new_expense_page::new_expense_form_view,
    },
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for storing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// The date when the expense occurred.
    pub date: Date,
    /// The category of the expense.
    pub category: String,
    /// The amount of money spent in dollars.
    pub amount: f64,
    /// An optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for recording a new expense, redirects to the expenses
/// view on success.
///
/// Validation failures re-render the form with a warning instead of storing
/// anything.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let category = match CategoryName::new(&form.category) {
        Ok(category) => category,
        Err(error) => {
            return new_expense_form_view(form.date, &format!("Error: {error}")).into_response();
        }
    };

    let new_expense = match NewExpense::new(form.date, category, form.amount) {
        Ok(new_expense) => new_expense,
        Err(error) => {
            return new_expense_form_view(form.date, &format!("Error: {error}")).into_response();
        }
    };
    let new_expense = new_expense.note(form.note.as_deref().unwrap_or_default());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_expense(new_expense, &connection) {
        Ok(expense) => {
            tracing::info!(
                "Recorded expense {}: {} {} on {}",
                expense.id,
                expense.category,
                expense.amount,
                expense.date
            );

            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while recording an expense: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::{ElementRef, Html};
    use time::macros::date;

    use crate::{db::initialize, endpoints, expense::core::get_all_expenses};

    use super::{CreateExpenseState, ExpenseForm, create_expense_endpoint};

    fn get_create_state() -> CreateExpenseState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CreateExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 05),
            category: "Food".to_string(),
            amount: 199.0,
            note: Some("lunch".to_string()),
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let expenses = get_all_expenses(&connection).unwrap();
        assert_eq!(expenses.len(), 1);
        let expense = &expenses[0];
        assert!(expense.id > 0);
        assert_eq!(expense.date, date!(2024 - 03 - 05));
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.amount, 199.0);
        assert_eq!(expense.note, "lunch");
    }

    #[tokio::test]
    async fn missing_note_is_stored_as_empty_string() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 10),
            category: "Food".to_string(),
            amount: 50.0,
            note: None,
        };

        create_expense_endpoint(State(state.clone()), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let expenses = get_all_expenses(&connection).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].note, "");
    }

    #[tokio::test]
    async fn rejects_zero_amount() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 05),
            category: "Food".to_string(),
            amount: 0.0,
            note: None,
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_fragment_html(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_error_message(
            &form,
            "Error: 0 is not a valid amount, the amount must be greater than zero",
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_all_expenses(&connection).unwrap(),
            Vec::new(),
            "nothing should be stored"
        );
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 05),
            category: "Food".to_string(),
            amount: -5.0,
            note: None,
        };

        create_expense_endpoint(State(state.clone()), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenses(&connection).unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn rejects_empty_category() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 05),
            category: "".to_string(),
            amount: 10.0,
            note: None,
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_fragment_html(response).await;
        let form = must_get_form(&html);
        assert_error_message(&form, "Error: Category cannot be empty");

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenses(&connection).unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn accepts_category_outside_the_suggestion_list() {
        let state = get_create_state();
        let form = ExpenseForm {
            date: date!(2024 - 03 - 05),
            category: "Vet".to_string(),
            amount: 80.0,
            note: None,
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenses(&connection).unwrap()[0].category, "Vet");
    }

    #[track_caller]
    fn assert_hx_redirect(response: &Response, endpoint: &str) {
        let header = response
            .headers()
            .get("hx-redirect")
            .expect("Headers missing hx-redirect");

        assert_eq!(header, endpoint);
    }

    async fn parse_fragment_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_fragment(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors {:?} for HTML {}",
            html.errors,
            html.html()
        );
    }

    #[track_caller]
    fn must_get_form(html: &Html) -> ElementRef<'_> {
        html.select(&scraper::Selector::parse("form").unwrap())
            .next()
            .expect("No form found")
    }

    #[track_caller]
    fn assert_error_message(form: &ElementRef, want_error_message: &str) {
        let p = scraper::Selector::parse("p").unwrap();
        let error_message = form
            .select(&p)
            .next()
            .expect("No error message found")
            .text()
            .collect::<Vec<_>>()
            .join("");
        let got_error_message = error_message.trim();

        assert_eq!(want_error_message, got_error_message);
    }
}
