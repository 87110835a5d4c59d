//! Defines the endpoint for recording a new income.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, endpoints, income::Income, user::UserID};

use super::{core::create_income, form::IncomeForm};

/// The state needed to create an income.
#[derive(Debug, Clone)]
pub struct CreateIncomeState {
    /// The database connection for managing incomes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a new income, redirects to the incomes
/// view on success.
pub async fn create_income_endpoint(
    State(state): State<CreateIncomeState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<IncomeForm>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = Income::build(
        form.amount,
        form.currency,
        form.date,
        &form.description,
        form.category_id,
        user_id,
    )
    .recurring(form.recurring)
    .expiration_date(form.expiration_date);

    if let Err(error) = create_income(builder, &connection) {
        tracing::warn!("Could not create income: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::INCOMES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
