//! Defines the endpoint for deleting every expense in the ledger.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, expense::core::delete_all_expenses};

/// The state needed to delete all expenses.
#[derive(Debug, Clone)]
pub struct DeleteAllState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAllState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting every expense.
///
/// The deletion is irreversible. The button that triggers this endpoint asks
/// for confirmation with `hx-confirm`; the store itself does not prompt.
pub async fn delete_all_endpoint(State(state): State<DeleteAllState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_all_expenses(&connection) {
        Ok(removed) => {
            tracing::info!("Deleted all {removed} expense(s)");

            Alert::SuccessSimple {
                message: "All expenses deleted. Refresh the page to update the table.".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete all expenses: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_all_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        expense::{
            CategoryName, NewExpense,
            core::{create_expense, get_all_expenses},
        },
    };

    use super::{DeleteAllState, delete_all_endpoint};

    fn get_delete_state() -> DeleteAllState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DeleteAllState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn empties_the_ledger() {
        let state = get_delete_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for (category, amount) in [("Food", 199.0), ("Transport", 2.5)] {
                create_expense(
                    NewExpense::new(
                        date!(2024 - 03 - 05),
                        CategoryName::new_unchecked(category),
                        amount,
                    )
                    .unwrap(),
                    &connection,
                )
                .expect("Could not create test expense");
            }
        }

        let response = delete_all_endpoint(State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenses(&connection).unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn works_on_an_already_empty_ledger() {
        let state = get_delete_state();

        let response = delete_all_endpoint(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
