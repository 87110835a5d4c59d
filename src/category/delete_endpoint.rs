//! Defines the endpoint for soft-deleting a category.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{AppState, Error, user::UserID};

use super::core::{CategoryId, soft_delete_category};

/// The state needed to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for soft-deleting a category.
///
/// Existing incomes keep the category; it only disappears from listings
/// and the income form.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match soft_delete_category(category_id, user_id, &connection) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => {
            tracing::warn!("Could not delete category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        category::{CategoryName, create_category, get_categories},
        db::initialize,
        user::{UserID, create_user},
    };

    use super::{DeleteCategoryState, delete_category_endpoint};

    fn get_test_state() -> (DeleteCategoryState, UserID, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let category =
            create_category(CategoryName::new_unchecked("Doomed"), user.id, &conn).unwrap();

        (
            DeleteCategoryState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
            category.id,
        )
    }

    #[tokio::test]
    async fn can_delete_category() {
        let (state, user_id, category_id) = get_test_state();

        let response =
            delete_category_endpoint(State(state.clone()), Extension(user_id), Path(category_id))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(
            get_categories(user_id, false, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn deleting_missing_category_returns_not_found() {
        let (state, user_id, _category_id) = get_test_state();

        let response = delete_category_endpoint(State(state), Extension(user_id), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
