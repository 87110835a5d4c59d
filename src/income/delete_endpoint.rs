//! Defines the endpoint for soft-deleting an income.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::IncomeId, user::UserID};

use super::core::soft_delete_income;

/// The state needed to delete an income.
#[derive(Debug, Clone)]
pub struct DeleteIncomeState {
    /// The database connection for managing incomes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for soft-deleting an income.
///
/// Returns an empty OK response so HTMX can remove the income's table row.
/// The row stays in the database and disappears from listings and reports.
pub async fn delete_income_endpoint(
    State(state): State<DeleteIncomeState>,
    Extension(user_id): Extension<UserID>,
    Path(income_id): Path<IncomeId>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match soft_delete_income(income_id, user_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => {
            tracing::warn!("Could not delete income {income_id}: {error}");
            error.into_alert_response()
        }
    }
}
