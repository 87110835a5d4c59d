//! The page for viewing and editing the user's reminder profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    user::UserID,
};

use super::core::get_profile;

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfilePageState {
    /// The database connection for reading the profile.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfilePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the profile page with the reminder destination form.
pub async fn get_profile_page(
    State(state): State<ProfilePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let whatsapp_number = match get_profile(user_id, &connection) {
        Ok(profile) => profile.whatsapp_number,
        Err(Error::NotFound) => String::new(),
        Err(error) => return Err(error),
    };

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Profile" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "The day before a recurring income lands, a reminder is \
                    sent to this WhatsApp number. Leave it unset to receive \
                    no reminders."
                }

                form
                    hx-put=(endpoints::PUT_PROFILE)
                    hx-target-4xx="this"
                    hx-target-5xx="this"
                    hx-swap="beforebegin"
                    class="space-y-4"
                {
                    div
                    {
                        label for="whatsapp_number" class=(FORM_LABEL_STYLE)
                        {
                            "WhatsApp number"
                        }

                        input
                            type="tel"
                            name="whatsapp_number"
                            id="whatsapp_number"
                            placeholder="+962790000000"
                            class=(FORM_TEXT_INPUT_STYLE)
                            required
                            value=(whatsapp_number);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    );

    Ok(base("Profile", &[], &content).into_response())
}
