//! The page for recording a new income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    category::get_categories,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    user::UserID,
};

use super::form::{IncomeFormValues, income_form};

/// How far ahead the pre-filled expiration date lies.
///
/// Mirrors the three year default the original records were created with;
/// the user can clear the field for an income that never expires.
const DEFAULT_EXPIRATION: Duration = Duration::days(3 * 365);

/// The state needed for the new-income page.
#[derive(Debug, Clone)]
pub struct CreateIncomePageState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateIncomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording a new income.
pub async fn get_create_income_page(
    State(state): State<CreateIncomePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, false, &connection)?;

    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = local_today(offset);

    let nav_bar = NavBar::new(endpoints::NEW_INCOME_VIEW).into_html();
    let form_values = IncomeFormValues {
        date: Some(today),
        expiration_date: Some(today + DEFAULT_EXPIRATION),
        ..Default::default()
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Add Income" }

                @if categories.is_empty() {
                    p
                    {
                        "You need a category before you can record an income. \
                        Create one "
                        a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE) { "here" }
                        "."
                    }
                } @else {
                    (income_form(
                        &form_values,
                        &categories,
                        "hx-post",
                        endpoints::POST_INCOME,
                        "Add Income",
                    ))
                }
            }
        }
    );

    Ok(base("Add Income", &[], &content).into_response())
}

#[cfg(test)]
mod get_create_income_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        category::{CategoryName, create_category},
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
        user::{UserID, create_user},
    };

    use super::{CreateIncomePageState, get_create_income_page};

    fn get_test_state(with_category: bool) -> (CreateIncomePageState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        if with_category {
            create_category(CategoryName::new_unchecked("Salary"), user.id, &conn).unwrap();
        }

        (
            CreateIncomePageState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn renders_form_with_prefilled_dates() {
        let (state, user_id) = get_test_state(true);

        let response = get_create_income_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_INCOME, "hx-post");

        let expiration_selector = Selector::parse("input[name='expiration_date']").unwrap();
        let expiration_input = html
            .select(&expiration_selector)
            .next()
            .expect("expiration input missing");
        assert!(
            !expiration_input.attr("value").unwrap_or_default().is_empty(),
            "expiration date should be pre-filled"
        );
    }

    #[tokio::test]
    async fn without_categories_prompts_to_create_one() {
        let (state, user_id) = get_test_state(false);

        let response = get_create_income_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let link_selector = Selector::parse(&format!(
            "a[href='{}']",
            endpoints::NEW_CATEGORY_VIEW
        ))
        .unwrap();
        assert!(html.select(&link_selector).next().is_some());
    }
}
