//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register already belongs to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// A stored recurrence tag did not name a known recurrence rule.
    ///
    /// This is a data-integrity fault: it can only happen if a row was
    /// written outside the application. Report paths should skip the
    /// offending record and log a warning so the rest of the report can
    /// still be served.
    #[error("{0:?} is not a valid recurrence code")]
    InvalidRecurrence(String),

    /// A stored currency tag did not name a supported currency.
    #[error("{0:?} is not a supported currency code")]
    InvalidCurrency(String),

    /// A report was requested for a month outside 1-12.
    ///
    /// Rejected at the HTTP layer, before the reporting engine runs.
    #[error("{0} is not a valid month number")]
    InvalidMonth(u8),

    /// A negative amount was used to create or update an income.
    #[error("income amounts must not be negative")]
    NegativeAmount,

    /// An income description was empty or longer than the allowed maximum.
    #[error("description must be between 1 and 150 characters")]
    InvalidDescription,

    /// The category ID used to create an income did not match one of the
    /// user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A category name was empty or contained characters other than
    /// letters, digits, and spaces.
    #[error("category names must be non-empty and alphanumeric")]
    InvalidCategoryName,

    /// The user already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete an income that does not exist or is not owned by the user
    #[error("tried to delete an income that is not in the database")]
    DeleteMissingIncome,

    /// Tried to update an income that does not exist or is not owned by the user
    #[error("tried to update an income that is not in the database")]
    UpdateMissingIncome,

    /// Tried to delete a category that does not exist or is not owned by the user
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a category that does not exist or is not owned by the user
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NegativeAmount => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    "Income amounts must not be negative. Enter zero or a positive amount.",
                ),
            ),
            Error::InvalidDescription => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid description",
                    "The description is required and must be at most 150 characters.",
                ),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid category",
                    &format!("Could not find a category with the ID {category_id:?}"),
                ),
            ),
            Error::InvalidCategoryName => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid category name",
                    "Category names must be non-empty and contain only letters, \
                    digits, and spaces.",
                ),
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Duplicate category name",
                    &format!(
                        "The category \"{name}\" already exists. \
                        Choose a different name, or edit or delete the existing category."
                    ),
                ),
            ),
            Error::UpdateMissingIncome => (
                StatusCode::NOT_FOUND,
                Alert::error("Could not update income", "The income could not be found."),
            ),
            Error::DeleteMissingIncome => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete income",
                    "The income could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update category",
                    "The category could not be found.",
                ),
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
