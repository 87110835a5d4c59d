//! The closed set of currencies an income can be recorded in.
//!
//! Amounts in different currencies are never converted or mixed; the
//! currency tag only segregates totals.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A supported currency, stored as its ISO 4217 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Jordanian Dinar.
    #[serde(rename = "JOD")]
    Jod,
    /// Saudi Riyal.
    #[serde(rename = "SAR")]
    Sar,
    /// Turkish Lira.
    #[serde(rename = "TRY")]
    Try,
    /// US Dollar.
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// All currencies in the order they appear in forms.
    pub const ALL: [Currency; 4] = [Currency::Jod, Currency::Sar, Currency::Try, Currency::Usd];

    /// Parse an ISO 4217 code.
    ///
    /// # Errors
    /// Returns [Error::InvalidCurrency] for codes outside the supported set.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        match code {
            "JOD" => Ok(Self::Jod),
            "SAR" => Ok(Self::Sar),
            "TRY" => Ok(Self::Try),
            "USD" => Ok(Self::Usd),
            _ => Err(Error::InvalidCurrency(code.to_owned())),
        }
    }

    /// The ISO 4217 code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Self::Jod => "JOD",
            Self::Sar => "SAR",
            Self::Try => "TRY",
            Self::Usd => "USD",
        }
    }

    /// A human readable label for display in forms.
    pub fn label(self) -> &'static str {
        match self {
            Self::Jod => "Jordanian Dinar",
            Self::Sar => "Saudi Riyal",
            Self::Try => "Turkish Lira",
            Self::Usd => "US Dollar",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Currency::from_code(code)
            .map_err(|_| FromSqlError::Other(format!("unknown currency code {code:?}").into()))
    }
}
