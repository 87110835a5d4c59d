//! The registration page and endpoint for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        log_in_register,
    },
    shared_templates::render,
    user::create_user,
};

/// The shortest password the registration form will accept.
///
/// The real gate is the strength estimate in
/// [ValidatedPassword](crate::ValidatedPassword); the minimum length only
/// exists for client-side feedback.
const PASSWORD_MIN_LENGTH: u8 = 8;

#[derive(Debug, Default)]
struct RegisterFormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn register_form(email_value: &str, errors: &RegisterFormErrors) -> Markup {
    let field_error = |message: Option<&str>| {
        html!(
            @if let Some(message) = message {
                p class="text-red-500 text-base" { (message) }
            }
        )
    };

    html!(
        form
            hx-post=(endpoints::USERS)
            hx-target="this"
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(email_value);

                (field_error(errors.email))
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    minlength=(PASSWORD_MIN_LENGTH);

                (field_error(errors.password))
            }

            div
            {
                label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm password" }

                input
                    type="password"
                    name="confirm_password"
                    id="confirm_password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    minlength=(PASSWORD_MIN_LENGTH);

                (field_error(errors.confirm_password))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create account" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in"))
            }
        }
    )
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let content = log_in_register(
        "Create an account",
        &register_form("", &RegisterFormErrors::default()),
    );

    render(StatusCode::OK, base("Register", &[], &content))
}

/// The state needed to register a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The email to register with.
    pub email: String,
    /// The chosen password in plain text.
    pub password: String,
    /// The password typed a second time.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the new user is logged in immediately and redirected to the
/// incomes page. Otherwise the form is re-rendered with error messages.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim();

    // The form swaps itself via outerHTML, so error responses return just
    // the form fragment, not the whole card.
    if !email.contains('@') {
        return render(
            StatusCode::OK,
            register_form(
                email,
                &RegisterFormErrors {
                    email: Some("Enter a valid email address."),
                    ..Default::default()
                },
            ),
        );
    }

    if form.password != form.confirm_password {
        return render(
            StatusCode::OK,
            register_form(
                email,
                &RegisterFormErrors {
                    confirm_password: Some("Passwords do not match."),
                    ..Default::default()
                },
            ),
        );
    }

    let password_hash =
        match PasswordHash::from_raw_password(&form.password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => password_hash,
            Err(Error::TooWeak(feedback)) => {
                return render(
                    StatusCode::OK,
                    register_form(
                        email,
                        &RegisterFormErrors {
                            password: Some(&format!("Password is too weak: {feedback}")),
                            ..Default::default()
                        },
                    ),
                );
            }
            Err(error) => {
                tracing::error!("Could not hash password: {error}");
                return error.into_response();
            }
        };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match create_user(email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return render(
                    StatusCode::OK,
                    register_form(
                        email,
                        &RegisterFormErrors {
                            email: Some("This email is already registered."),
                            ..Default::default()
                        },
                    ),
                );
            }
            Err(error) => {
                tracing::error!("Could not create user: {error}");
                return error.into_response();
            }
        }
    };

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::INCOMES_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

#[cfg(test)]
mod register_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn form_posts_to_users_api() {
        let response = get_register_page().await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
    }
}
