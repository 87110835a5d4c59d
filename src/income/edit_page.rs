//! The page for editing an existing income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::get_categories,
    database_id::IncomeId,
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    user::UserID,
};

use super::{
    core::get_income,
    form::{IncomeFormValues, income_form},
};

/// The state needed for the edit-income page.
#[derive(Debug, Clone)]
pub struct EditIncomePageState {
    /// The database connection for reading the income and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditIncomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing one of the user's incomes.
pub async fn get_edit_income_page(
    State(state): State<EditIncomePageState>,
    Extension(user_id): Extension<UserID>,
    Path(income_id): Path<IncomeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let income = get_income(income_id, user_id, &connection)?;
    let categories = get_categories(user_id, false, &connection)?;

    let nav_bar = NavBar::new(endpoints::INCOMES_VIEW).into_html();
    let endpoint = format_endpoint(endpoints::PUT_INCOME, income.id);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Income" }

                (income_form(
                    &IncomeFormValues::from(&income),
                    &categories,
                    "hx-put",
                    &endpoint,
                    "Save Changes",
                ))
            }
        }
    );

    Ok(base("Edit Income", &[], &content).into_response())
}

#[cfg(test)]
mod get_edit_income_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        category::{CategoryName, create_category},
        currency::Currency,
        db::initialize,
        income::{Income, create_income},
        test_utils::{assert_valid_html, must_get_form, parse_html_document},
        user::{UserID, create_user},
    };

    use super::{EditIncomePageState, get_edit_income_page};

    fn get_test_state() -> (EditIncomePageState, UserID, i64) {
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
                dec!(99.95),
                Currency::Try,
                date!(2024 - 05 - 01),
                "Freelance gig",
                category.id,
                user.id,
            ),
            &conn,
        )
        .unwrap();

        (
            EditIncomePageState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
            income.id,
        )
    }

    #[tokio::test]
    async fn renders_form_with_income_values() {
        let (state, user_id, income_id) = get_test_state();

        let response = get_edit_income_page(State(state), Extension(user_id), Path(income_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert!(form.value().attr("hx-put").is_some());

        let amount_selector = Selector::parse("input[name='amount']").unwrap();
        let amount_input = html.select(&amount_selector).next().unwrap();
        assert_eq!(amount_input.attr("value"), Some("99.95"));

        let description_selector = Selector::parse("input[name='description']").unwrap();
        let description_input = html.select(&description_selector).next().unwrap();
        assert_eq!(description_input.attr("value"), Some("Freelance gig"));
    }

    #[tokio::test]
    async fn missing_income_is_not_found() {
        let (state, user_id, _income_id) = get_test_state();

        let result = get_edit_income_page(State(state), Extension(user_id), Path(999)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn other_users_income_is_not_found() {
        let (state, _user_id, income_id) = get_test_state();
        let other_user = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "other@example.com",
                PasswordHash::new_unchecked("hunter3"),
                &connection,
            )
            .unwrap()
        };

        let result =
            get_edit_income_page(State(state), Extension(other_user.id), Path(income_id)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
