//! The 404 not found page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for unmatched routes.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get a response containing the rendered 404 not found page.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Sorry, that page does not exist.",
            "Check the address for typos, or head back to the expenses page.",
        ),
    )
        .into_response()
}
