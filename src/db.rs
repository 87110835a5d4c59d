/*! Database initialization for the application. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    category::create_category_table, income::create_income_table,
    profile::create_user_profile_table, user::create_user_table,
};

/// Create the tables for the application's domain models.
///
/// Tables are created inside a single exclusive transaction, so a crash
/// during startup leaves either a complete schema or none of it. Foreign
/// key enforcement is switched on for the connection.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_income_table(&transaction)?;
    create_user_profile_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
