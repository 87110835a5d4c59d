//! Recurrence rules and the expansion of incomes into occurrence dates.
//!
//! An income either happens once (on its anchor date) or repeats on a
//! calendar interval. Expansion produces the finite, ascending sequence of
//! dates on which the income lands, bounded by a horizon date. All date
//! arithmetic is calendar-aware: steps are whole months, never fixed day
//! counts, so month-length variation and leap years are handled correctly.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::Error;

/// How often an income repeats.
///
/// The stored form is the two-letter code used by the database and HTML
/// forms ("NO", "MO", "QO", "SO", "YO").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// The income happens exactly once, on its anchor date.
    #[serde(rename = "NO")]
    None,
    /// Repeats every calendar month.
    #[serde(rename = "MO")]
    Monthly,
    /// Repeats every three calendar months.
    #[serde(rename = "QO")]
    Quarterly,
    /// Repeats every six calendar months.
    #[serde(rename = "SO")]
    SemiAnnual,
    /// Repeats every calendar year.
    #[serde(rename = "YO")]
    Annual,
}

impl Recurrence {
    /// All recurrence options in the order they appear in forms.
    pub const ALL: [Recurrence; 5] = [
        Recurrence::None,
        Recurrence::Monthly,
        Recurrence::Quarterly,
        Recurrence::SemiAnnual,
        Recurrence::Annual,
    ];

    /// Parse the stored two-letter code.
    ///
    /// # Errors
    /// Returns [Error::InvalidRecurrence] for codes that do not name a
    /// known recurrence. Callers reading rows from the database should
    /// treat this as a data-integrity fault: either skip the record and
    /// log a warning (report paths) or propagate the error.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        match code {
            "NO" => Ok(Self::None),
            "MO" => Ok(Self::Monthly),
            "QO" => Ok(Self::Quarterly),
            "SO" => Ok(Self::SemiAnnual),
            "YO" => Ok(Self::Annual),
            _ => Err(Error::InvalidRecurrence(code.to_owned())),
        }
    }

    /// The two-letter code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Self::None => "NO",
            Self::Monthly => "MO",
            Self::Quarterly => "QO",
            Self::SemiAnnual => "SO",
            Self::Annual => "YO",
        }
    }

    /// A human readable label for display in forms and tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No Recurrence",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::SemiAnnual => "Semi-annually",
            Self::Annual => "Annually",
        }
    }

    /// The calendar step between occurrences in whole months, or `None`
    /// for a one-off income.
    pub fn step_months(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::SemiAnnual => Some(6),
            Self::Annual => Some(12),
        }
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Recurrence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Recurrence::from_code(code)
            .map_err(|_| FromSqlError::Other(format!("unknown recurrence code {code:?}").into()))
    }
}

/// The dates on which an income lands, in ascending order.
///
/// Produced by [occurrences]. The iterator is finite (it stops once a
/// candidate passes the horizon), stateless with respect to the outside
/// world, and restartable: cloning it, or calling [occurrences] again with
/// the same arguments, yields the same sequence.
///
/// Each occurrence is computed as the anchor advanced by a whole number of
/// steps, so the sequence never drifts: an income anchored on the 31st
/// lands on the 31st in every month long enough to have one, and on the
/// last day of shorter months.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: Date,
    step_months: Option<u32>,
    horizon: Date,
    index: u32,
}

/// Expand an income anchored at `anchor` with rule `recurrence` into its
/// occurrence dates up to and including `horizon`.
///
/// A one-off income yields at most one date (the anchor, if it does not
/// pass the horizon). If `anchor > horizon` the sequence is empty.
/// Termination is guaranteed: every step strictly advances the candidate
/// date and the horizon is a fixed ceiling.
pub fn occurrences(anchor: Date, recurrence: Recurrence, horizon: Date) -> Occurrences {
    Occurrences {
        anchor,
        step_months: recurrence.step_months(),
        horizon,
        index: 0,
    }
}

impl Iterator for Occurrences {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let date = match (self.index, self.step_months) {
            (0, _) => self.anchor,
            (_, None) => return None,
            (index, Some(step)) => add_months(self.anchor, index * step),
        };

        if date > self.horizon {
            return None;
        }

        self.index += 1;
        Some(date)
    }
}

/// Advance `date` by `months` whole calendar months.
///
/// The day-of-month is kept where possible and clamped to the last valid
/// day of the target month otherwise (e.g. 31 January + 1 month is
/// 28 February, or 29 February in a leap year).
pub fn add_months(date: Date, months: u32) -> Date {
    let months_from_zero = u8::from(date.month()) as u32 - 1 + months;
    let year = date.year() + (months_from_zero / 12) as i32;
    let month = month_from_number((months_from_zero % 12 + 1) as u8);
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("clamped day is always a valid date")
}

pub(crate) fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub(crate) fn month_from_number(month: u8) -> Month {
    match month {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => panic!("invalid month number {month}"),
    }
}



#[cfg(test)]
mod occurrences_tests {
    use time::macros::date;

    use super::{Recurrence, occurrences};

    #[test]
    fn one_off_yields_anchor_only() {
        let dates: Vec<_> =
            occurrences(date!(2024 - 03 - 15), Recurrence::None, date!(2024 - 12 - 31)).collect();

        assert_eq!(dates, vec![date!(2024 - 03 - 15)]);
    }

    #[test]
    fn one_off_past_horizon_is_empty() {
        let dates: Vec<_> =
            occurrences(date!(2025 - 01 - 01), Recurrence::None, date!(2024 - 12 - 31)).collect();

        assert!(dates.is_empty());
    }

    #[test]
    fn recurring_past_horizon_is_empty() {
        let dates: Vec<_> = occurrences(
            date!(2025 - 01 - 01),
            Recurrence::Monthly,
            date!(2024 - 12 - 31),
        )
        .collect();

        assert!(dates.is_empty());
    }

    #[test]
    fn monthly_occurrences_are_one_calendar_month_apart() {
        let dates: Vec<_> = occurrences(
            date!(2024 - 01 - 15),
            Recurrence::Monthly,
            date!(2024 - 05 - 31),
        )
        .collect();

        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 15),
                date!(2024 - 02 - 15),
                date!(2024 - 03 - 15),
                date!(2024 - 04 - 15),
                date!(2024 - 05 - 15),
            ]
        );
    }

    #[test]
    fn month_end_anchor_clamps_and_recovers() {
        let dates: Vec<_> = occurrences(
            date!(2024 - 01 - 31),
            Recurrence::Monthly,
            date!(2024 - 04 - 30),
        )
        .collect();

        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 31),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 31),
                date!(2024 - 04 - 30),
            ]
        );
    }

    #[test]
    fn horizon_date_itself_is_included() {
        let dates: Vec<_> = occurrences(
            date!(2024 - 01 - 01),
            Recurrence::Monthly,
            date!(2024 - 03 - 01),
        )
        .collect();

        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 01),
                date!(2024 - 02 - 01),
                date!(2024 - 03 - 01),
            ]
        );
    }

    #[test]
    fn quarterly_and_annual_steps() {
        let quarterly: Vec<_> = occurrences(
            date!(2024 - 01 - 10),
            Recurrence::Quarterly,
            date!(2024 - 12 - 31),
        )
        .collect();
        assert_eq!(
            quarterly,
            vec![
                date!(2024 - 01 - 10),
                date!(2024 - 04 - 10),
                date!(2024 - 07 - 10),
                date!(2024 - 10 - 10),
            ]
        );

        let annual: Vec<_> = occurrences(
            date!(2023 - 06 - 01),
            Recurrence::Annual,
            date!(2025 - 12 - 31),
        )
        .collect();
        assert_eq!(
            annual,
            vec![
                date!(2023 - 06 - 01),
                date!(2024 - 06 - 01),
                date!(2025 - 06 - 01),
            ]
        );
    }

    #[test]
    fn iterator_is_restartable() {
        let expansion = occurrences(
            date!(2024 - 01 - 01),
            Recurrence::Monthly,
            date!(2024 - 06 - 30),
        );

        let first: Vec<_> = expansion.clone().collect();
        let second: Vec<_> = expansion.collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }
}
