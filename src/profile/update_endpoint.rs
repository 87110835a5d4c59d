//! Defines the endpoint for saving the user's reminder profile.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, alert::Alert, shared_templates::render, user::UserID};

use super::core::upsert_profile;

/// The state needed to update a profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileState {
    /// The database connection for managing profiles.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating the reminder profile.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    /// The WhatsApp number reminders are sent to.
    pub whatsapp_number: String,
}

/// A route handler for saving the reminder destination.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> impl IntoResponse {
    let whatsapp_number = form.whatsapp_number.trim();

    if whatsapp_number.is_empty() {
        return render(
            StatusCode::BAD_REQUEST,
            Alert::error(
                "Invalid WhatsApp number",
                "The WhatsApp number must be a non-empty string.",
            )
            .into_html(),
        );
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match upsert_profile(user_id, whatsapp_number, &connection) {
        Ok(_) => render(
            StatusCode::OK,
            Alert::success("Profile saved", "Reminders will go to the new number.").into_html(),
        ),
        Err(error) => {
            tracing::error!("Could not update profile: {error}");
            error.into_alert_response()
        }
    }
}
