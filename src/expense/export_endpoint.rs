//! Defines the endpoint for downloading expenses as a CSV backup.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{
        core::get_all_expenses, csv::expenses_to_csv, expenses_page::FilterParams,
        filter::filter_expenses,
    },
};

/// The state needed to export expenses.
#[derive(Debug, Clone)]
pub struct ExportCsvState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportCsvState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that serves the current (optionally filtered) expenses as
/// a downloadable CSV file.
///
/// The handler accepts the same query parameters as the expenses page, so
/// the "Download filtered CSV" link exports exactly what the table shows.
/// With no parameters it exports the full ledger.
pub async fn export_csv_endpoint(
    State(state): State<ExportCsvState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(&connection)?;
    drop(connection);

    let filtered = filter_expenses(&expenses, &params.to_filter());
    let document = expenses_to_csv(&filtered)?;

    tracing::info!("Exporting {} expense(s) as CSV", filtered.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expenses.csv\"",
            ),
        ],
        document,
    )
        .into_response())
}
