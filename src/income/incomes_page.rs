//! Displays the user's incomes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    AppState, Error,
    currency::Currency,
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_amount,
    },
    navigation::NavBar,
    recurrence::Recurrence,
    user::UserID,
};

/// The state needed for the [get_incomes_page] route handler.
#[derive(Debug, Clone)]
pub struct IncomesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IncomesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The income data to display in the view
#[derive(Debug, PartialEq)]
struct IncomeTableRow {
    amount: Decimal,
    currency: Currency,
    date: Date,
    description: String,
    category: String,
    recurring: Recurrence,
    expiration_date: Option<Date>,
    edit_url: String,
    delete_url: String,
}

fn incomes_view(incomes: &[IncomeTableRow]) -> Markup {
    let create_income_page_url = endpoints::NEW_INCOME_VIEW;
    let nav_bar = NavBar::new(endpoints::INCOMES_VIEW).into_html();

    let table_row = |income: &IncomeTableRow| {
        let amount_str = format_amount(income.amount, income.currency);
        let action_links = edit_delete_action_links(
            &income.edit_url,
            &income.delete_url,
            &format!(
                "Are you sure you want to delete the income '{}'?",
                income.description
            ),
            "closest tr",
            "delete",
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (income.description)
                }

                td class="px-6 py-4 text-right whitespace-nowrap"
                {
                    (amount_str)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(income.date) { (income.date) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (income.category) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (income.recurring.label())
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @match income.expiration_date {
                        Some(expiration_date) => time datetime=(expiration_date) { (expiration_date) }
                        None => span class="text-gray-400" { "Never" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (action_links)
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Incomes" }

                    a href=(create_income_page_url) class=(LINK_STYLE)
                    {
                        "Add Income"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-6xl lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Recurrence" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Expires" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for income in incomes {
                                (table_row(income))
                            }

                            @if incomes.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No incomes found. Record your first income "
                                        a href=(create_income_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Incomes", &[], &content)
}

/// Renders the incomes page showing the user's active incomes.
pub async fn get_incomes_page(
    State(state): State<IncomesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let incomes = get_income_rows(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get incomes: {error}"))?;

    Ok(incomes_view(&incomes).into_response())
}

fn get_income_rows(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<IncomeTableRow>, Error> {
    connection
        .prepare(
            "SELECT i.id, i.amount, i.currency, i.date, i.description, i.recurring,
                    i.expiration_date, c.name
             FROM income i
             INNER JOIN category c ON c.id = i.category_id
             WHERE i.user_id = :user_id AND i.is_deleted = 0
             ORDER BY i.date DESC, i.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let id: i64 = row.get(0)?;
            let raw_amount: String = row.get(1)?;
            let amount = raw_amount.parse::<Decimal>().map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?;

            Ok(IncomeTableRow {
                amount,
                currency: row.get(2)?,
                date: row.get(3)?,
                description: row.get(4)?,
                recurring: row.get(5)?,
                expiration_date: row.get(6)?,
                category: row.get(7)?,
                edit_url: format_endpoint(endpoints::EDIT_INCOME_VIEW, id),
                delete_url: format_endpoint(endpoints::DELETE_INCOME, id),
            })
        })?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}
