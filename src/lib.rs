//! Spendtrack is a web app for recording and reviewing personal expenses.
//!
//! This library provides a small HTTP server that directly serves HTML pages
//! backed by a single SQLite database file. The expense ledger lives in the
//! [expense] module; the rest of the crate is routing, templating, and the
//! shared application state.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod navigation;
mod not_found;
mod routing;
mod state;
mod timezone;

pub use error::Error;
pub use routing::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
