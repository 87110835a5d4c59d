//! Defines the endpoint for renaming a category.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, endpoints, user::UserID};

use super::{
    core::{CategoryId, CategoryName, update_category},
    create_endpoint::CategoryForm,
};

/// The state needed to rename a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for renaming a category, redirects to the categories
/// view on success.
pub async fn edit_category_endpoint(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> impl IntoResponse {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_category(category_id, user_id, name, &connection) {
        tracing::warn!("Could not update category {category_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
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

    use crate::{
        PasswordHash,
        category::{CategoryName, create_category, get_category},
        db::initialize,
        user::{UserID, create_user},
    };

    use super::{CategoryForm, EditCategoryState, edit_category_endpoint};

    fn get_test_state() -> (EditCategoryState, UserID, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let category =
            create_category(CategoryName::new_unchecked("Salry"), user.id, &conn).unwrap();

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
            category.id,
        )
    }

    #[tokio::test]
    async fn can_rename_category() {
        let (state, user_id, category_id) = get_test_state();
        let form = CategoryForm {
            name: "Salary".to_owned(),
        };

        let response = edit_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category_id),
            Form(form),
        )
        .await
        .into_response();

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        let category = get_category(category_id, user_id, &connection).unwrap();
        assert_eq!(category.name.as_ref(), "Salary");
    }

    #[tokio::test]
    async fn renaming_missing_category_returns_not_found() {
        let (state, user_id, _category_id) = get_test_state();
        let form = CategoryForm {
            name: "Salary".to_owned(),
        };

        let response =
            edit_category_endpoint(State(state), Extension(user_id), Path(999), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
