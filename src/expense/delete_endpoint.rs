//! Defines the endpoint for deleting a single expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::core::{ExpenseId, delete_expense},
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an expense by its ID.
///
/// Deleting an id that is not in the ledger is a no-op, not an error; either
/// way the row is gone, so the response is an empty fragment that HTMX swaps
/// in place of the table row.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, &connection) {
        // The status code has to be 200 OK or HTMX will not remove the
        // table row.
        Ok(removed) => {
            tracing::info!("Deleted {removed} expense(s) for id {expense_id}");
            Html("").into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        expense::{
            CategoryName, NewExpense,
            core::{create_expense, get_all_expenses},
        },
    };

    use super::{DeleteExpenseState, delete_expense_endpoint};

    fn get_delete_state() -> DeleteExpenseState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DeleteExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn add_expense(state: &DeleteExpenseState, amount: f64) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_expense(
            NewExpense::new(
                date!(2024 - 03 - 05),
                CategoryName::new_unchecked("Food"),
                amount,
            )
            .unwrap(),
            &connection,
        )
        .expect("Could not create test expense")
        .id
    }

    #[tokio::test]
    async fn deletes_the_expense() {
        let state = get_delete_state();
        let id = add_expense(&state, 12.3);

        let response = delete_expense_endpoint(State(state.clone()), Path(id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenses(&connection).unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn absent_id_is_a_no_op_not_an_error() {
        let state = get_delete_state();
        let id = add_expense(&state, 12.3);

        let response = delete_expense_endpoint(State(state.clone()), Path(id + 999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_all_expenses(&connection).unwrap().len(),
            1,
            "the store should be unchanged"
        );
    }
}
