//! The page for renaming an existing category.

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
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    user::UserID,
};

use super::{
    core::{CategoryId, get_category},
    create_page::category_form,
};

/// The state needed for the edit-category page.
#[derive(Debug, Clone)]
pub struct EditCategoryPageState {
    /// The database connection for reading the category.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for renaming one of the user's categories.
pub async fn get_edit_category_page(
    State(state): State<EditCategoryPageState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let endpoint = format_endpoint(endpoints::PUT_CATEGORY, category.id);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Edit Category" }

                (category_form(
                    category.name.as_ref(),
                    "hx-put",
                    &endpoint,
                    "Save Changes",
                ))
            }
        }
    );

    Ok(base("Edit Category", &[], &content).into_response())
}
