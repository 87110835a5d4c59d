//! Defines the endpoint for updating an existing income.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, database_id::IncomeId, endpoints, income::Income, user::UserID,
};

use super::{core::update_income, form::IncomeForm};

/// The state needed to update an income.
#[derive(Debug, Clone)]
pub struct EditIncomeState {
    /// The database connection for managing incomes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating an income, redirects to the incomes view on
/// success.
pub async fn edit_income_endpoint(
    State(state): State<EditIncomeState>,
    Extension(user_id): Extension<UserID>,
    Path(income_id): Path<IncomeId>,
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

    if let Err(error) = update_income(income_id, builder, &connection) {
        tracing::warn!("Could not update income {income_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::INCOMES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        response::IntoResponse,
    };
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        PasswordHash,
        category::{CategoryName, create_category},
        currency::Currency,
        db::initialize,
        income::{Income, create_income, get_income},
        recurrence::Recurrence,
        user::{UserID, create_user},
    };

    use super::{EditIncomeState, IncomeForm, edit_income_endpoint};

    fn get_test_state() -> (EditIncomeState, UserID, i64, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let category =
            create_category(CategoryName::new_unchecked("Salary"), user.id, &conn).unwrap();
        let income = create_income(
            Income::build(
                dec!(100),
                Currency::Usd,
                date!(2024 - 01 - 01),
                "Before",
                category.id,
                user.id,
            ),
            &conn,
        )
        .unwrap();

        (
            EditIncomeState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
            category.id,
            income.id,
        )
    }

    #[tokio::test]
    async fn can_update_income() {
        let (state, user_id, category_id, income_id) = get_test_state();
        let form = IncomeForm {
            amount: dec!(250.75),
            currency: Currency::Sar,
            date: date!(2024 - 02 - 01),
            description: "After".to_owned(),
            category_id,
            recurring: Recurrence::SemiAnnual,
            expiration_date: None,
        };

        let response = edit_income_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(income_id),
            Form(form),
        )
        .await
        .into_response();

        assert!(response.headers().get(HX_REDIRECT).is_some());

        let connection = state.db_connection.lock().unwrap();
        let income = get_income(income_id, user_id, &connection).unwrap();
        assert_eq!(income.amount, dec!(250.75));
        assert_eq!(income.currency, Currency::Sar);
        assert_eq!(income.description, "After");
        assert_eq!(income.recurring, Recurrence::SemiAnnual);
        assert_eq!(income.expiration_date, None);
    }

    #[tokio::test]
    async fn updating_missing_income_returns_not_found() {
        let (state, user_id, category_id, _income_id) = get_test_state();
        let form = IncomeForm {
            amount: dec!(1),
            currency: Currency::Usd,
            date: date!(2024 - 02 - 01),
            description: "Nope".to_owned(),
            category_id,
            recurring: Recurrence::None,
            expiration_date: None,
        };

        let response = edit_income_endpoint(
            State(state),
            Extension(user_id),
            Path(999),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
