//! Dinari is a web app for tracking your incomes: one-off and recurring,
//! in several currencies, with monthly reports of what has accrued and
//! what is still to come, and WhatsApp-style reminders the day before a
//! recurring income lands.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod currency;
mod database_id;
mod db;
mod endpoints;
mod error;
mod forgot_password;
mod html;
mod income;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod profile;
mod recurrence;
mod register_user;
mod reminder;
mod report;
mod routing;
mod shared_templates;
#[cfg(test)]
mod test_utils;
mod timezone;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use password::{PasswordHash, ValidatedPassword};
pub use recurrence::{Occurrences, Recurrence, add_months, occurrences};
pub use reminder::{
    LoggingSender, ReminderRunSummary, ReminderSender, SendError, TemplateVariables,
    is_due_tomorrow, send_due_reminders,
};
pub use report::{MonthWindow, Occurrence, Totals, classify, occurrences_in_window, totals};
pub use routing::build_router;
pub use timezone::{get_local_offset, local_today};
pub use user::{User, UserID, create_user, get_user_by_email, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
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
