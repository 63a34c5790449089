//! Defines the endpoint for deleting the expenses selected in the ledger
//! table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form collects the repeated `selected` checkbox values into a
// Vec, which axum::Form does not support.
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, alert::Alert,
    expense::core::{ExpenseId, delete_expenses},
};

/// The state needed to delete selected expenses.
#[derive(Debug, Clone)]
pub struct DeleteSelectedState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSelectedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for deleting selected expenses.
#[derive(Debug, Deserialize)]
pub struct DeleteSelectedForm {
    /// The IDs of the expenses to delete.
    #[serde(default)]
    pub selected: Vec<ExpenseId>,
}

/// A route handler for deleting every selected expense in one transaction.
///
/// IDs that are no longer in the ledger are ignored. Responds with a success
/// alert reporting how many records were removed.
pub async fn delete_selected_endpoint(
    State(state): State<DeleteSelectedState>,
    Form(form): Form<DeleteSelectedForm>,
) -> Response {
    if form.selected.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: "No selection".to_owned(),
                details: "Tick the checkbox of at least one expense to delete.".to_owned(),
            }
            .into_html(),
        )
            .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expenses(&form.selected, &connection) {
        Ok(removed) => {
            tracing::info!(
                "Deleted {removed} of {} selected expense(s)",
                form.selected.len()
            );

            Alert::Success {
                message: format!("Deleted {removed} expense(s)"),
                details: "Refresh the page to update the table.".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete selected expenses: {error}");
            error.into_alert_response()
        }
    }
}
