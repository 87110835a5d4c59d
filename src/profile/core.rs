//! Defines the reminder profile model and database queries.
//!
//! The profile holds the WhatsApp number reminders are sent to. A user
//! without a profile simply receives no reminders.

use rusqlite::{Connection, params};

use crate::{Error, user::UserID};

/// Where a user's reminder notifications go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// The user this profile belongs to.
    pub user_id: UserID,
    /// The WhatsApp number to send reminders to for this user.
    pub whatsapp_number: String,
}

/// Create the user profile table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_user_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_profile (
                user_id INTEGER PRIMARY KEY,
                whatsapp_number TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Retrieve the reminder profile for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user has no profile yet,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<UserProfile, Error> {
    let profile = connection
        .prepare("SELECT user_id, whatsapp_number FROM user_profile WHERE user_id = :user_id")?
        .query_one(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(UserProfile {
                user_id: UserID::new(row.get(0)?),
                whatsapp_number: row.get(1)?,
            })
        })?;

    Ok(profile)
}

/// Create or replace the reminder profile for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn upsert_profile(
    user_id: UserID,
    whatsapp_number: &str,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    connection.execute(
        "INSERT INTO user_profile (user_id, whatsapp_number) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET whatsapp_number = excluded.whatsapp_number",
        params![user_id.as_i64(), whatsapp_number],
    )?;

    Ok(UserProfile {
        user_id,
        whatsapp_number: whatsapp_number.to_owned(),
    })
}
