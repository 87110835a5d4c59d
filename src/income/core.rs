//! Defines the core data models and database queries for incomes.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{CategoryId, get_category},
    currency::Currency,
    database_id::IncomeId,
    recurrence::Recurrence,
    user::UserID,
};

/// The longest description an income may carry.
pub const DESCRIPTION_MAX_LENGTH: usize = 150;

// ============================================================================
// MODELS
// ============================================================================

/// Money a user receives, once or on a recurring schedule.
///
/// To create a new `Income`, use [Income::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// The ID of the income.
    pub id: IncomeId,
    /// How much money is received each occurrence. Never negative.
    pub amount: Decimal,
    /// The currency the amount is denominated in.
    pub currency: Currency,
    /// The anchor date: the first (or only) day the income lands.
    pub date: Date,
    /// A text description of where the money comes from.
    pub description: String,
    /// How often the income repeats.
    pub recurring: Recurrence,
    /// The date after which this income is considered expired.
    ///
    /// No occurrence may fall after this date. May legally be before the
    /// anchor date, in which case the income produces no occurrences at all.
    pub expiration_date: Option<Date>,
    /// The category the income belongs to.
    pub category_id: CategoryId,
    /// The user who owns this income.
    pub user_id: UserID,
}

impl Income {
    /// Create a new income.
    ///
    /// Shortcut for [IncomeBuilder] for discoverability.
    pub fn build(
        amount: Decimal,
        currency: Currency,
        date: Date,
        description: &str,
        category_id: CategoryId,
        user_id: UserID,
    ) -> IncomeBuilder {
        IncomeBuilder {
            amount,
            currency,
            date,
            description: description.to_owned(),
            recurring: Recurrence::None,
            expiration_date: None,
            category_id,
            user_id,
        }
    }
}

/// A builder for creating [Income] instances.
///
/// Recurrence defaults to [Recurrence::None] and the expiration date to
/// unset. Pass the finished builder to [create_income].
#[derive(Debug, PartialEq, Clone)]
pub struct IncomeBuilder {
    /// How much money is received each occurrence.
    pub amount: Decimal,
    /// The currency the amount is denominated in.
    pub currency: Currency,
    /// The anchor date of the income.
    pub date: Date,
    /// A text description of where the money comes from.
    pub description: String,
    /// How often the income repeats.
    pub recurring: Recurrence,
    /// The date after which the income stops producing occurrences.
    pub expiration_date: Option<Date>,
    /// The category the income belongs to.
    pub category_id: CategoryId,
    /// The user who owns this income.
    pub user_id: UserID,
}

impl IncomeBuilder {
    /// Set how often the income repeats.
    pub fn recurring(mut self, recurring: Recurrence) -> Self {
        self.recurring = recurring;
        self
    }

    /// Set the date after which the income stops producing occurrences.
    pub fn expiration_date(mut self, expiration_date: Option<Date>) -> Self {
        self.expiration_date = expiration_date;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(Error::NegativeAmount);
        }

        if self.description.trim().is_empty() || self.description.len() > DESCRIPTION_MAX_LENGTH {
            return Err(Error::InvalidDescription);
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the income table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS income (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                recurring TEXT NOT NULL,
                expiration_date TEXT,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                deleted_at TEXT,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the report and reminder queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_income_user_date ON income(user_id, date);",
        (),
    )?;

    Ok(())
}

const INCOME_COLUMNS: &str =
    "id, amount, currency, date, description, recurring, expiration_date, category_id, user_id";

/// Map a database row to an [Income].
///
/// Expects the columns selected by the queries in this module: id, amount,
/// currency, date, description, recurring, expiration_date, category_id,
/// user_id.
pub fn map_income_row(row: &Row) -> Result<Income, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;
    let amount = raw_amount.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Income {
        id: row.get(0)?,
        amount,
        currency: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        recurring: row.get(5)?,
        expiration_date: row.get(6)?,
        category_id: row.get(7)?,
        user_id: UserID::new(row.get(8)?),
    })
}

/// Create a new income in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidDescription] if the description is empty or too long,
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_income(builder: IncomeBuilder, connection: &Connection) -> Result<Income, Error> {
    builder.validate()?;
    ensure_category_is_owned(builder.category_id, builder.user_id, connection)?;

    connection.execute(
        "INSERT INTO income (amount, currency, date, description, recurring, expiration_date, category_id, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            builder.amount.to_string(),
            builder.currency,
            builder.date,
            builder.description,
            builder.recurring,
            builder.expiration_date,
            builder.category_id,
            builder.user_id.as_i64(),
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Income {
        id,
        amount: builder.amount,
        currency: builder.currency,
        date: builder.date,
        description: builder.description,
        recurring: builder.recurring,
        expiration_date: builder.expiration_date,
        category_id: builder.category_id,
        user_id: builder.user_id,
    })
}

/// Retrieve one of `user_id`'s incomes by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an income owned by the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_income(id: IncomeId, user_id: UserID, connection: &Connection) -> Result<Income, Error> {
    let income = connection
        .prepare(&format!(
            "SELECT {INCOME_COLUMNS} FROM income WHERE id = :id AND user_id = :user_id"
        ))?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_income_row,
        )?;

    Ok(income)
}

/// Retrieve the incomes owned by `user_id`, newest anchor date first.
///
/// Soft-deleted rows are excluded unless `include_deleted` is set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_incomes(
    user_id: UserID,
    include_deleted: bool,
    connection: &Connection,
) -> Result<Vec<Income>, Error> {
    connection
        .prepare(&format!(
            "SELECT {INCOME_COLUMNS} FROM income
             WHERE user_id = :user_id AND (is_deleted = 0 OR :include_deleted)
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":include_deleted": include_deleted,
            },
            map_income_row,
        )?
        .map(|income_result| income_result.map_err(Error::from))
        .collect()
}

/// Retrieve the active (non-deleted) incomes that could contribute
/// occurrences to a report window ending on `window_last_day`, optionally
/// restricted to one category.
///
/// Incomes whose expiration date has passed before `window_first_day` are
/// excluded in SQL so they are never expanded at all. Rows that cannot be
/// mapped (e.g. an unknown recurrence code written outside the app) are
/// skipped with a warning instead of failing the whole report, so one bad
/// row degrades the report rather than the page.
///
/// # Errors
/// This function will return a [Error::SqlError] if the query itself fails.
pub fn get_incomes_for_window(
    user_id: UserID,
    category_id: Option<CategoryId>,
    window_first_day: Date,
    connection: &Connection,
) -> Result<Vec<Income>, Error> {
    let mut statement = connection.prepare(&format!(
        "SELECT {INCOME_COLUMNS} FROM income
         WHERE user_id = :user_id
           AND is_deleted = 0
           AND (expiration_date IS NULL OR expiration_date >= :window_first_day)
           AND (:category_id IS NULL OR category_id = :category_id)
         ORDER BY date ASC, id ASC"
    ))?;

    let incomes = statement
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":window_first_day": window_first_day,
                ":category_id": category_id,
            },
            map_income_row,
        )?
        .filter_map(|income_result| match income_result {
            Ok(income) => Some(income),
            Err(error) => {
                tracing::warn!("skipping unreadable income row: {error}");
                None
            }
        })
        .collect();

    Ok(incomes)
}

/// Update one of `user_id`'s incomes with the fields from `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] or [Error::InvalidDescription] if validation fails,
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - [Error::UpdateMissingIncome] if `id` does not refer to an income owned
///   by the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_income(
    id: IncomeId,
    builder: IncomeBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    builder.validate()?;
    ensure_category_is_owned(builder.category_id, builder.user_id, connection)?;

    let rows_changed = connection.execute(
        "UPDATE income
         SET amount = ?1, currency = ?2, date = ?3, description = ?4,
             recurring = ?5, expiration_date = ?6, category_id = ?7
         WHERE id = ?8 AND user_id = ?9",
        params![
            builder.amount.to_string(),
            builder.currency,
            builder.date,
            builder.description,
            builder.recurring,
            builder.expiration_date,
            builder.category_id,
            id,
            builder.user_id.as_i64(),
        ],
    )?;

    if rows_changed == 0 {
        return Err(Error::UpdateMissingIncome);
    }

    Ok(())
}

/// Soft-delete one of `user_id`'s incomes.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingIncome] if `id` does not refer to an income owned
///   by the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn soft_delete_income(
    id: IncomeId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_changed = connection.execute(
        "UPDATE income SET is_deleted = 1, deleted_at = datetime('now')
         WHERE id = ?1 AND user_id = ?2 AND is_deleted = 0",
        params![id, user_id.as_i64()],
    )?;

    if rows_changed == 0 {
        return Err(Error::DeleteMissingIncome);
    }

    Ok(())
}

fn ensure_category_is_owned(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(category_id, user_id, connection).map_err(|error| match error {
        // The server should not reveal whether the category exists under
        // another user, so both cases map to the same error.
        Error::NotFound => Error::InvalidCategory(Some(category_id)),
        error => error,
    })?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
