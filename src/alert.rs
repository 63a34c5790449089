//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as small HTML fragments that HTMX swaps into the
//! `#alert-container` element of the base layout.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_SUCCESS_STYLE: &str = "block p-4 mb-4 rounded-lg border \
    text-green-800 border-green-300 bg-green-50 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ALERT_ERROR_STYLE: &str = "block p-4 mb-4 rounded-lg border \
    text-red-800 border-red-300 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

/// A success or error message to be displayed to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something worked, with extra detail worth showing.
    Success {
        /// A short headline for the alert.
        message: String,
        /// Extra detail displayed below the headline.
        details: String,
    },
    /// Something worked and the headline says it all.
    SuccessSimple {
        /// A short headline for the alert.
        message: String,
    },
    /// Something went wrong.
    Error {
        /// A short headline for the alert.
        message: String,
        /// Extra detail displayed below the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (ALERT_SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (ALERT_SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, details),
        };

        html!(
            div class=(style) role="alert"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p class="mt-1 text-sm" { (details) }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
