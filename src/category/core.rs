//! Defines the core data models and database queries for categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated category name.
///
/// Names are non-empty and contain only letters, digits, spaces, and
/// underscores. Uniqueness per user is enforced by the database
/// (case-insensitively, via `COLLATE NOCASE`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryName] if `name` is empty after
    /// trimming or contains characters other than letters, digits, spaces,
    /// and underscores.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        let is_valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == ' ' || c == '_');

        if is_valid {
            Ok(Self(name.to_string()))
        } else {
            Err(Error::InvalidCategoryName)
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string satisfies the invariants of
    /// [CategoryName::new]. This function has `_unchecked` in the name but
    /// is not `unsafe`, because a violation causes incorrect behaviour but
    /// does not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A grouping label for incomes (e.g. 'Salary', 'Rent', 'Dividends').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The category's name.
    pub name: CategoryName,
    /// The user who owns this category.
    pub user_id: UserID,
}

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL COLLATE NOCASE,
                user_id INTEGER NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                deleted_at TEXT,
                UNIQUE(user_id, name),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Category].
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let user_id = UserID::new(row.get(2)?);

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        user_id,
    })
}

/// Create a new category owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if the user already has a category with
///   this name (compared case-insensitively),
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, user_id) VALUES (?1, ?2)",
            params![name.as_ref(), user_id.as_i64()],
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicateCategoryName(name.to_string())
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, user_id })
}

/// Retrieve one of `user_id`'s categories by its `id`.
///
/// Soft-deleted categories are still returned so that old incomes can keep
/// displaying their category name.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare("SELECT id, name, user_id FROM category WHERE id = :id AND user_id = :user_id")?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )?;

    Ok(category)
}

/// Retrieve the categories owned by `user_id`, ordered by name.
///
/// Soft-deleted rows are excluded unless `include_deleted` is set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_categories(
    user_id: UserID,
    include_deleted: bool,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, user_id FROM category
             WHERE user_id = :user_id AND (is_deleted = 0 OR :include_deleted)
             ORDER BY name ASC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":include_deleted": include_deleted,
            },
            map_category_row,
        )?
        .map(|category_result| category_result.map_err(Error::from))
        .collect()
}

/// Rename one of `user_id`'s categories.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingCategory] if `id` does not refer to a category
///   owned by the user,
/// - [Error::DuplicateCategoryName] if the new name collides with another
///   of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    id: CategoryId,
    user_id: UserID,
    name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_changed = connection
        .execute(
            "UPDATE category SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            params![name.as_ref(), id, user_id.as_i64()],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 2067 => {
                Error::DuplicateCategoryName(name.to_string())
            }
            error => error.into(),
        })?;

    if rows_changed == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Soft-delete one of `user_id`'s categories.
///
/// The row stays in the database (incomes referencing it keep their
/// category) but disappears from listings and forms.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `id` does not refer to a category
///   owned by the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn soft_delete_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_changed = connection.execute(
        "UPDATE category SET is_deleted = 1, deleted_at = datetime('now')
         WHERE id = ?1 AND user_id = ?2 AND is_deleted = 0",
        params![id, user_id.as_i64()],
    )?;

    if rows_changed == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
