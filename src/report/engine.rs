//! Expansion of incomes into a reporting window and aggregation of the
//! resulting occurrences.
//!
//! Everything in this module is pure: deterministic functions of the
//! records and dates passed in, no I/O, no clock reads. The handlers in
//! [report_page](super::report_page) supply today's date so the split
//! between accrued and upcoming amounts is testable.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::Date;

use crate::{currency::Currency, income::Income, recurrence::occurrences};

use super::window::MonthWindow;

/// One concrete day an income lands on, within a reporting window.
///
/// Derived and ephemeral: occurrences are computed per report and never
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    /// The day the income lands.
    pub date: Date,
    /// The income that produced the occurrence.
    pub income: &'a Income,
}

/// Expand `incomes` into the occurrences that fall inside `window`.
///
/// Each income is expanded up to its effective horizon, the earlier of the
/// window's last day and the income's expiration date. An expiration date
/// is an inclusive hard ceiling: an occurrence landing exactly on it is
/// kept, one landing after it is never produced. Incomes that expired
/// before the window begins are skipped without being expanded.
///
/// The result is ordered by date, ascending. Occurrences sharing a date
/// keep the order their incomes appeared in `incomes`, so output is
/// deterministic for a given input order.
pub fn occurrences_in_window<'a>(
    incomes: &'a [Income],
    window: &MonthWindow,
) -> Vec<Occurrence<'a>> {
    let mut result = Vec::new();

    for income in incomes {
        let expired_before_window = income
            .expiration_date
            .is_some_and(|expiration| expiration < window.first_day());
        if expired_before_window {
            continue;
        }

        let horizon = match income.expiration_date {
            Some(expiration) => expiration.min(window.last_day()),
            None => window.last_day(),
        };

        for date in occurrences(income.date, income.recurring, horizon) {
            // The generator is already bounded by the horizon; the explicit
            // expiration check stays as a hard ceiling in case the two ever
            // disagree.
            let within_expiration = income
                .expiration_date
                .is_none_or(|expiration| date <= expiration);

            if window.contains(date) && within_expiration {
                result.push(Occurrence { date, income });
            }
        }
    }

    result.sort_by_key(|occurrence| occurrence.date);

    result
}

/// Split `occurrences` into (accrued, upcoming) around `today`.
///
/// Accrued means the occurrence date is on or before `today`; upcoming
/// means strictly after. Every occurrence lands in exactly one half.
/// `today` is supplied by the caller rather than read from a clock so the
/// split is reproducible in tests.
pub fn classify<'a>(
    occurrences: Vec<Occurrence<'a>>,
    today: Date,
) -> (Vec<Occurrence<'a>>, Vec<Occurrence<'a>>) {
    occurrences
        .into_iter()
        .partition(|occurrence| occurrence.date <= today)
}

/// Occurrence amounts summed per currency.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    /// Exact sum of amounts per currency. This is the primary output;
    /// subtotals of different currencies are never combined.
    pub by_currency: BTreeMap<Currency, Decimal>,
    /// The raw numeric sum of every amount regardless of currency.
    ///
    /// Only meaningful when all occurrences share one currency. Callers
    /// that display it must label it as an unconverted raw sum.
    pub unconverted_sum: Decimal,
}

/// Sum the amounts of `occurrences` per currency.
///
/// Sums use exact decimal arithmetic, so cents never drift no matter how
/// many small amounts are added.
pub fn totals(occurrences: &[Occurrence]) -> Totals {
    let mut by_currency: BTreeMap<Currency, Decimal> = BTreeMap::new();
    let mut unconverted_sum = Decimal::ZERO;

    for occurrence in occurrences {
        *by_currency
            .entry(occurrence.income.currency)
            .or_insert(Decimal::ZERO) += occurrence.income.amount;
        unconverted_sum += occurrence.income.amount;
    }

    Totals {
        by_currency,
        unconverted_sum,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        currency::Currency, income::Income, recurrence::Recurrence, report::MonthWindow,
        user::UserID,
    };

    use super::{Occurrence, classify, occurrences_in_window, totals};

    fn test_income(
        id: i64,
        amount: rust_decimal::Decimal,
        currency: Currency,
        anchor: Date,
        recurring: Recurrence,
        expiration_date: Option<Date>,
    ) -> Income {
        Income {
            id,
            amount,
            currency,
            date: anchor,
            description: format!("income {id}"),
            recurring,
            expiration_date,
            category_id: 1,
            user_id: UserID::new(1),
        }
    }

    fn dates(occurrences: &[Occurrence]) -> Vec<Date> {
        occurrences.iter().map(|occurrence| occurrence.date).collect()
    }

    #[test]
    fn one_off_income_appears_in_its_month_only() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 03 - 15),
            Recurrence::None,
            None,
        )];

        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());
        let april = occurrences_in_window(&incomes, &MonthWindow::new(2024, 4).unwrap());

        assert_eq!(dates(&march), vec![date!(2024 - 03 - 15)]);
        assert!(april.is_empty());
    }

    #[test]
    fn monthly_income_lands_once_per_month() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2023 - 11 - 10),
            Recurrence::Monthly,
            None,
        )];

        let occurrences =
            occurrences_in_window(&incomes, &MonthWindow::new(2024, 2).unwrap());

        assert_eq!(dates(&occurrences), vec![date!(2024 - 02 - 10)]);
    }

    #[test]
    fn all_dates_stay_inside_the_window() {
        let incomes = vec![
            test_income(
                1,
                dec!(100),
                Currency::Usd,
                date!(2023 - 01 - 31),
                Recurrence::Monthly,
                None,
            ),
            test_income(
                2,
                dec!(50),
                Currency::Usd,
                date!(2024 - 02 - 05),
                Recurrence::None,
                None,
            ),
        ];
        let window = MonthWindow::new(2024, 2).unwrap();

        let occurrences = occurrences_in_window(&incomes, &window);

        assert!(!occurrences.is_empty());
        for occurrence in &occurrences {
            assert!(occurrence.date >= window.first_day());
            assert!(occurrence.date <= window.last_day());
        }
    }

    #[test]
    fn month_end_anchor_clamps_into_short_months() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 01 - 31),
            Recurrence::Monthly,
            None,
        )];

        let february =
            occurrences_in_window(&incomes, &MonthWindow::new(2024, 2).unwrap());
        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        assert_eq!(dates(&february), vec![date!(2024 - 02 - 29)]);
        assert_eq!(dates(&march), vec![date!(2024 - 03 - 31)]);
    }

    #[test]
    fn expired_before_window_contributes_nothing() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 01 - 01),
            Recurrence::Monthly,
            Some(date!(2024 - 02 - 15)),
        )];

        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        assert!(march.is_empty());
    }

    #[test]
    fn occurrence_on_expiration_date_is_included() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 01 - 01),
            Recurrence::Monthly,
            Some(date!(2024 - 03 - 01)),
        )];

        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        // Expiration is an inclusive ceiling: the 1 March occurrence lands
        // exactly on it and is kept; nothing later in March appears.
        assert_eq!(dates(&march), vec![date!(2024 - 03 - 01)]);
    }

    #[test]
    fn no_occurrence_after_expiration_even_mid_window() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 01 - 20),
            Recurrence::Monthly,
            Some(date!(2024 - 03 - 10)),
        )];

        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        // 20 March would be in the window but passes the expiration date.
        assert!(march.is_empty());
    }

    #[test]
    fn already_expired_record_is_legal_and_empty() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 03 - 15),
            Recurrence::None,
            Some(date!(2024 - 03 - 01)),
        )];

        let march = occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        assert!(march.is_empty());
    }

    #[test]
    fn output_is_sorted_with_stable_ties() {
        let incomes = vec![
            test_income(
                2,
                dec!(10),
                Currency::Usd,
                date!(2024 - 03 - 15),
                Recurrence::None,
                None,
            ),
            test_income(
                1,
                dec!(20),
                Currency::Usd,
                date!(2024 - 03 - 15),
                Recurrence::None,
                None,
            ),
            test_income(
                3,
                dec!(30),
                Currency::Usd,
                date!(2024 - 03 - 01),
                Recurrence::None,
                None,
            ),
        ];

        let occurrences =
            occurrences_in_window(&incomes, &MonthWindow::new(2024, 3).unwrap());

        let ids: Vec<i64> = occurrences
            .iter()
            .map(|occurrence| occurrence.income.id)
            .collect();
        // Sorted by date; the two 15 March occurrences keep input order.
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn classify_partitions_totally() {
        let incomes = vec![test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 03 - 05),
            Recurrence::Monthly,
            None,
        )];
        let window = MonthWindow::new(2024, 3).unwrap();
        let occurrences = occurrences_in_window(&incomes, &window);
        let input_len = occurrences.len();

        let (accrued, upcoming) = classify(occurrences, date!(2024 - 03 - 05));

        assert_eq!(accrued.len() + upcoming.len(), input_len);
        assert!(accrued.iter().all(|o| o.date <= date!(2024 - 03 - 05)));
        assert!(upcoming.iter().all(|o| o.date > date!(2024 - 03 - 05)));
    }

    #[test]
    fn classify_puts_today_in_accrued() {
        let income = test_income(
            1,
            dec!(100),
            Currency::Usd,
            date!(2024 - 03 - 05),
            Recurrence::None,
            None,
        );
        let occurrences = vec![Occurrence {
            date: date!(2024 - 03 - 05),
            income: &income,
        }];

        let (accrued, upcoming) = classify(occurrences.clone(), date!(2024 - 03 - 05));
        assert_eq!(accrued.len(), 1);
        assert!(upcoming.is_empty());

        let (accrued, upcoming) = classify(occurrences, date!(2024 - 03 - 04));
        assert!(accrued.is_empty());
        assert_eq!(upcoming.len(), 1);
    }

    #[test]
    fn totals_sum_exactly_per_currency() {
        let first = test_income(
            1,
            dec!(100.00),
            Currency::Usd,
            date!(2024 - 03 - 01),
            Recurrence::None,
            None,
        );
        let second = test_income(
            2,
            dec!(200.50),
            Currency::Usd,
            date!(2024 - 03 - 02),
            Recurrence::None,
            None,
        );
        let occurrences = vec![
            Occurrence {
                date: first.date,
                income: &first,
            },
            Occurrence {
                date: second.date,
                income: &second,
            },
        ];

        let totals = totals(&occurrences);

        assert_eq!(totals.by_currency[&Currency::Usd], dec!(300.50));
        assert_eq!(totals.unconverted_sum, dec!(300.50));
    }

    #[test]
    fn totals_never_mix_currencies() {
        let dinars = test_income(
            1,
            dec!(70.25),
            Currency::Jod,
            date!(2024 - 03 - 01),
            Recurrence::None,
            None,
        );
        let dollars = test_income(
            2,
            dec!(100.00),
            Currency::Usd,
            date!(2024 - 03 - 02),
            Recurrence::None,
            None,
        );
        let occurrences = vec![
            Occurrence {
                date: dinars.date,
                income: &dinars,
            },
            Occurrence {
                date: dollars.date,
                income: &dollars,
            },
        ];

        let totals = totals(&occurrences);

        assert_eq!(totals.by_currency[&Currency::Jod], dec!(70.25));
        assert_eq!(totals.by_currency[&Currency::Usd], dec!(100.00));
        // The raw sum exists but is explicitly unconverted.
        assert_eq!(totals.unconverted_sum, dec!(170.25));
    }

    #[test]
    fn many_small_amounts_do_not_drift() {
        let income = test_income(
            1,
            dec!(0.10),
            Currency::Usd,
            date!(2024 - 03 - 01),
            Recurrence::None,
            None,
        );
        let occurrences: Vec<Occurrence> = (0..1000)
            .map(|_| Occurrence {
                date: income.date,
                income: &income,
            })
            .collect();

        let totals = totals(&occurrences);

        assert_eq!(totals.by_currency[&Currency::Usd], dec!(100.00));
    }

    #[test]
    fn totals_of_nothing_are_empty() {
        let totals = totals(&[]);

        assert!(totals.by_currency.is_empty());
        assert_eq!(totals.unconverted_sum, rust_decimal::Decimal::ZERO);
    }
}
