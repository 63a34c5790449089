//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, delete_all_endpoint, delete_expense_endpoint,
        delete_selected_endpoint, export_csv_endpoint, get_expenses_page, get_new_expense_page,
    },
    html::error_view,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::DELETE_SELECTED, post(delete_selected_endpoint))
        .route(endpoints::DELETE_ALL, post(delete_all_endpoint))
        .route(endpoints::EXPORT_CSV, get(export_csv_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the expenses page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}

/// The page to display when an internal server error occurs.
async fn get_internal_server_error_page() -> Response {
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


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "Etc/UTC").unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    #[tokio::test]
    async fn serves_the_expenses_page() {
        let server = get_test_server();

        let response = server.get(endpoints::EXPENSES_VIEW).await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_the_new_expense_page() {
        let server = get_test_server();

        let response = server.get(endpoints::NEW_EXPENSE_VIEW).await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_the_csv_export() {
        let server = get_test_server();

        let response = server.get(endpoints::EXPORT_CSV).await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404_page() {
        let server = get_test_server();

        let response = server.get("/does-not-exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(StatusCode::IM_A_TEAPOT);
    }
}
