//! Decides whether an income is due for a reminder.

use time::{Date, Duration};

use crate::{income::Income, recurrence::occurrences};

/// Whether `income` lands tomorrow, seen from `today`.
///
/// Occurrences are generated with a ceiling one day past tomorrow so an
/// off-by-one in the bound can never hide tomorrow's occurrence. An income
/// whose expiration date is before `today` is never due; an expiration on
/// `today` itself still is, matching the record source's
/// "expiration_date is null or >= today" filter.
///
/// `today` is supplied by the caller so the decision is reproducible in
/// tests.
pub fn is_due_tomorrow(income: &Income, today: Date) -> bool {
    let expired = income
        .expiration_date
        .is_some_and(|expiration| expiration < today);
    if expired {
        return false;
    }

    let tomorrow = today + Duration::days(1);
    let ceiling = tomorrow + Duration::days(1);

    occurrences(income.date, income.recurring, ceiling).any(|date| date == tomorrow)
}
