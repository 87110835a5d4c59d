//! The monthly report page: accrued and upcoming occurrences with
//! per-currency totals.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};

use crate::{
    AppState, Error,
    category::{CategoryId, get_categories},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, FORM_SELECT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_amount,
    },
    income::get_incomes_for_window,
    navigation::NavBar,
    recurrence::add_months,
    timezone::{get_local_offset, local_today},
    user::UserID,
};

use super::{
    engine::{Occurrence, Totals, classify, occurrences_in_window, totals},
    window::MonthWindow,
};

/// The state needed for the [get_report_page] route handler.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading incomes and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name.
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the report page.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The year to report on. Defaults to the current year.
    pub year: Option<i32>,
    /// The month to report on (1-12). Defaults to the current month.
    pub month: Option<u8>,
    /// Restrict the report to one category. An empty value means all.
    #[serde(default, deserialize_with = "empty_string_as_none_id")]
    pub category: Option<CategoryId>,
}

/// Deserialize an optional ID query field, treating the empty string a
/// form submits for "all categories" as `None`.
fn empty_string_as_none_id<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<CategoryId>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Renders the monthly report.
///
/// A month outside 1-12 is rejected with a 400 before the reporting engine
/// runs.
pub async fn get_report_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = local_today(offset);

    let window = match (query.year, query.month) {
        (Some(year), Some(month)) => match MonthWindow::new(year, month) {
            Ok(window) => window,
            Err(error) => {
                return Ok((
                    StatusCode::BAD_REQUEST,
                    crate::html::error_view(
                        "Bad Request",
                        "400",
                        "That is not a valid report month.",
                        &error.to_string(),
                    ),
                )
                    .into_response());
            }
        },
        (Some(year), None) => MonthWindow::new(year, u8::from(today.month()))
            .expect("current month number is always valid"),
        _ => MonthWindow::containing(today),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let incomes =
        get_incomes_for_window(user_id, query.category, window.first_day(), &connection)?;

    // Deleted categories keep labelling old incomes, so include them here.
    let category_names: HashMap<CategoryId, String> = get_categories(user_id, true, &connection)?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();
    let filter_categories = get_categories(user_id, false, &connection)?;
    drop(connection);

    let occurrences = occurrences_in_window(&incomes, &window);
    let (accrued, upcoming) = classify(occurrences, today);

    let accrued_totals = totals(&accrued);
    let upcoming_totals = totals(&upcoming);
    let all: Vec<Occurrence> = accrued.iter().chain(upcoming.iter()).cloned().collect();
    let month_totals = totals(&all);

    let view = report_view(&ReportView {
        window,
        category_filter: query.category,
        accrued: &accrued,
        upcoming: &upcoming,
        accrued_totals,
        upcoming_totals,
        month_totals,
        category_names,
        filter_categories: filter_categories
            .iter()
            .map(|category| (category.id, category.name.to_string()))
            .collect(),
    });

    Ok(view.into_response())
}

struct ReportView<'a> {
    window: MonthWindow,
    category_filter: Option<CategoryId>,
    accrued: &'a [Occurrence<'a>],
    upcoming: &'a [Occurrence<'a>],
    accrued_totals: Totals,
    upcoming_totals: Totals,
    month_totals: Totals,
    category_names: HashMap<CategoryId, String>,
    filter_categories: Vec<(CategoryId, String)>,
}

fn report_view(view: &ReportView) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORT_VIEW).into_html();

    let next_month = MonthWindow::containing(add_months(view.window.first_day(), 1));
    let prev_month = MonthWindow::new(
        if view.window.month_number() == 1 {
            view.window.year() - 1
        } else {
            view.window.year()
        },
        if view.window.month_number() == 1 {
            12
        } else {
            view.window.month_number() - 1
        },
    )
    .expect("previous month number is always valid");

    let month_link = |window: &MonthWindow, label: &str| {
        let mut href = format!(
            "{}?year={}&month={}",
            endpoints::REPORT_VIEW,
            window.year(),
            window.month_number()
        );
        if let Some(category) = view.category_filter {
            href.push_str(&format!("&category={category}"));
        }
        html!( a href=(href) class=(LINK_STYLE) { (label) } )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Report - " (view.window.label()) }

                    div class="flex gap-4"
                    {
                        (month_link(&prev_month, "← Previous"))
                        (month_link(&next_month, "Next →"))
                    }
                }

                (filter_form(view))

                (totals_section(view))

                (occurrence_table("Accrued", view.accrued, &view.category_names))
                (occurrence_table("Upcoming", view.upcoming, &view.category_names))
            }
        }
    );

    base("Report", &[], &content)
}

fn filter_form(view: &ReportView) -> Markup {
    html!(
        form method="get" action=(endpoints::REPORT_VIEW) class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="year" class="block mb-1 text-sm" { "Year" }
                input
                    type="number"
                    name="year"
                    id="year"
                    class=(FORM_SELECT_STYLE)
                    value=(view.window.year());
            }

            div
            {
                label for="month" class="block mb-1 text-sm" { "Month" }
                input
                    type="number"
                    name="month"
                    id="month"
                    min="1"
                    max="12"
                    class=(FORM_SELECT_STYLE)
                    value=(view.window.month_number());
            }

            div
            {
                label for="category" class="block mb-1 text-sm" { "Category" }
                select name="category" id="category" class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[view.category_filter.is_none()] { "All" }
                    @for (id, name) in &view.filter_categories {
                        option value=(id) selected[view.category_filter == Some(*id)] { (name) }
                    }
                }
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600 text-white rounded"
            {
                "Show"
            }
        }
    )
}

fn totals_section(view: &ReportView) -> Markup {
    let currencies: Vec<_> = view.month_totals.by_currency.keys().copied().collect();
    let mixed_currencies = currencies.len() > 1;

    html!(
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { "Totals" }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                        th scope="col" class="px-6 py-3 text-right" { "Accrued" }
                        th scope="col" class="px-6 py-3 text-right" { "Upcoming" }
                        th scope="col" class="px-6 py-3 text-right" { "Total" }
                    }
                }

                tbody
                {
                    @for currency in &currencies {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (currency.code()) }
                            td class="px-6 py-4 text-right"
                            {
                                (format_amount(
                                    view.accrued_totals.by_currency.get(currency).copied().unwrap_or_default(),
                                    *currency,
                                ))
                            }
                            td class="px-6 py-4 text-right"
                            {
                                (format_amount(
                                    view.upcoming_totals.by_currency.get(currency).copied().unwrap_or_default(),
                                    *currency,
                                ))
                            }
                            td class="px-6 py-4 text-right font-semibold"
                            {
                                (format_amount(
                                    view.month_totals.by_currency.get(currency).copied().unwrap_or_default(),
                                    *currency,
                                ))
                            }
                        }
                    }

                    @if currencies.is_empty() {
                        tr
                        {
                            td colspan="4" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "Nothing lands in this month."
                            }
                        }
                    }
                }
            }

            @if mixed_currencies {
                p class="mt-2 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Unconverted raw sum across all currencies: "
                    (view.month_totals.unconverted_sum)
                    ". This number adds different currencies together without \
                    conversion; use the per-currency rows above."
                }
            }
        }
    )
}

fn occurrence_table(
    title: &str,
    occurrences: &[Occurrence],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    html!(
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { (title) }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for occurrence in occurrences {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                time datetime=(occurrence.date) { (occurrence.date) }
                            }
                            td class=(TABLE_CELL_STYLE) { (occurrence.income.description) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE)
                                {
                                    (category_names
                                        .get(&occurrence.income.category_id)
                                        .map(String::as_str)
                                        .unwrap_or("General"))
                                }
                            }
                            td class="px-6 py-4 text-right whitespace-nowrap"
                            {
                                (format_amount(occurrence.income.amount, occurrence.income.currency))
                            }
                        }
                    }

                    @if occurrences.is_empty() {
                        tr
                        {
                            td colspan="4" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "None"
                            }
                        }
                    }
                }
            }
        }
    )
}


#[cfg(test)]
mod get_report_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PasswordHash,
        category::{CategoryName, create_category},
        currency::Currency,
        db::initialize,
        income::{Income, create_income},
        recurrence::Recurrence,
        test_utils::{assert_valid_html, parse_html_document},
        user::{UserID, create_user},
    };

    use super::{ReportQuery, ReportState, get_report_page};

    fn get_test_state() -> (ReportState, UserID, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let category =
            create_category(CategoryName::new_unchecked("Salary"), user.id, &conn).unwrap();

        (
            ReportState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
            category.id,
        )
    }

    fn query(year: i32, month: u8) -> Query<ReportQuery> {
        Query(ReportQuery {
            year: Some(year),
            month: Some(month),
            category: None,
        })
    }

    #[tokio::test]
    async fn report_shows_occurrences_and_totals() {
        let (state, user_id, category_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_income(
                Income::build(
                    dec!(100.00),
                    Currency::Usd,
                    date!(2024 - 01 - 05),
                    "Salary",
                    category_id,
                    user_id,
                )
                .recurring(Recurrence::Monthly),
                &connection,
            )
            .unwrap();
            create_income(
                Income::build(
                    dec!(200.50),
                    Currency::Usd,
                    date!(2024 - 03 - 10),
                    "Bonus",
                    category_id,
                    user_id,
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_report_page(State(state), Extension(user_id), query(2024, 3))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        // 100.00 + 200.50 in March, summed exactly.
        assert!(text.contains("300.50 USD"), "missing total in: {text}");
        assert!(text.contains("Salary"));
        assert!(text.contains("Bonus"));
    }

    #[tokio::test]
    async fn invalid_month_is_rejected_before_the_engine_runs() {
        let (state, user_id, _category_id) = get_test_state();

        let response = get_report_page(State(state), Extension(user_id), query(2024, 13))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mixed_currencies_show_unconverted_raw_sum_label() {
        let (state, user_id, category_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_income(
                Income::build(
                    dec!(70.25),
                    Currency::Jod,
                    date!(2024 - 03 - 01),
                    "Rent paid to me",
                    category_id,
                    user_id,
                ),
                &connection,
            )
            .unwrap();
            create_income(
                Income::build(
                    dec!(100.00),
                    Currency::Usd,
                    date!(2024 - 03 - 02),
                    "Consulting",
                    category_id,
                    user_id,
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_report_page(State(state), Extension(user_id), query(2024, 3))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Unconverted raw sum"));
        assert!(text.contains("170.25"));
    }

    #[tokio::test]
    async fn category_filter_limits_report() {
        let (state, user_id, salary_id) = get_test_state();
        let gifts_id = {
            let connection = state.db_connection.lock().unwrap();
            let gifts = create_category(
                CategoryName::new_unchecked("Gifts"),
                user_id,
                &connection,
            )
            .unwrap();
            create_income(
                Income::build(
                    dec!(100),
                    Currency::Usd,
                    date!(2024 - 03 - 01),
                    "Salary",
                    salary_id,
                    user_id,
                ),
                &connection,
            )
            .unwrap();
            create_income(
                Income::build(
                    dec!(55),
                    Currency::Usd,
                    date!(2024 - 03 - 02),
                    "Birthday",
                    gifts.id,
                    user_id,
                ),
                &connection,
            )
            .unwrap();
            gifts.id
        };

        let response = get_report_page(
            State(state),
            Extension(user_id),
            Query(ReportQuery {
                year: Some(2024),
                month: Some(3),
                category: Some(gifts_id),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Birthday"));
        assert!(text.contains("55.00 USD"), "expected gift amount");
        assert!(
            !text.contains("100.00 USD"),
            "salary should be filtered out"
        );
    }

    #[tokio::test]
    async fn expired_income_is_absent_from_later_months() {
        let (state, user_id, category_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_income(
                Income::build(
                    dec!(100),
                    Currency::Usd,
                    date!(2024 - 01 - 01),
                    "Ends in Feb",
                    category_id,
                    user_id,
                )
                .recurring(Recurrence::Monthly)
                .expiration_date(Some(date!(2024 - 02 - 15))),
                &connection,
            )
            .unwrap();
        }

        let response = get_report_page(State(state), Extension(user_id), query(2024, 3))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Nothing lands in this month."));
    }

    #[tokio::test]
    async fn report_page_has_month_navigation() {
        let (state, user_id, _category_id) = get_test_state();

        let response = get_report_page(State(state), Extension(user_id), query(2024, 1))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let link_selector = Selector::parse("a").unwrap();
        let hrefs: Vec<&str> = html
            .select(&link_selector)
            .filter_map(|a| a.attr("href"))
            .collect();
        assert!(hrefs.contains(&"/report?year=2023&month=12"), "{hrefs:?}");
        assert!(hrefs.contains(&"/report?year=2024&month=2"), "{hrefs:?}");
    }
}
