//! The calendar month a report covers.

use time::{Date, Month};

use crate::{
    Error,
    recurrence::{last_day_of_month, month_from_number},
};

/// One calendar month of one year, the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    year: i32,
    month: Month,
}

impl MonthWindow {
    /// Create a window for `month_number` (1-12) of `year`.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month_number` is outside 1-12.
    /// This is the caller-precondition check: the reporting engine itself
    /// never sees an invalid month.
    pub fn new(year: i32, month_number: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month_number) {
            return Err(Error::InvalidMonth(month_number));
        }

        Ok(Self {
            year,
            month: month_from_number(month_number),
        })
    }

    /// The window containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first calendar day of the window.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).expect("day 1 exists in every month")
    }

    /// The last calendar day of the window.
    pub fn last_day(&self) -> Date {
        let day = last_day_of_month(self.year, self.month);
        Date::from_calendar_date(self.year, self.month, day)
            .expect("last day of month is always valid")
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The window's year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The window's month number (1-12).
    pub fn month_number(&self) -> u8 {
        u8::from(self.month)
    }

    /// A label like "January 2024" for page headings.
    pub fn label(&self) -> String {
        let month_name = match self.month {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        };

        format!("{month_name} {}", self.year)
    }
}
