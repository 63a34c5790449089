//! Defines the app level error type and conversions to rendered HTML pages
//! and alerts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, html::error_view, not_found::get_404_not_found_response};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A zero or negative amount was used to create an expense.
    ///
    /// Expenses record money that was spent, so the amount must be strictly
    /// positive. This is checked at the entry boundary, before anything
    /// reaches storage.
    #[error("{0} is not a valid amount, the amount must be greater than zero")]
    NonPositiveAmount(f64),

    /// An empty string was used as an expense category.
    #[error("Category cannot be empty")]
    EmptyCategory,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows. Note
    /// that the delete operations do **not** produce this error: deleting an
    /// id that is not in the ledger is defined as a no-op.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical
    /// timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing expenses as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_view(
                    "Internal Server Error",
                    "500",
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string."
                    ),
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Sorry, something went wrong.",
                        "Try again later or check the server logs.",
                    ),
                )
                    .into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NonPositiveAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is not a valid amount. The amount must be greater than zero."
                    ),
                },
            ),
            Error::EmptyCategory => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: "The category cannot be empty.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string."
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use crate::Error;

    #[test]
    fn maps_no_rows_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn maps_other_sql_errors_to_sql_error() {
        let error: Error = rusqlite::Error::InvalidQuery.into();

        assert_eq!(error, Error::SqlError(rusqlite::Error::InvalidQuery));
    }
}
