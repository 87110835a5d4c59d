//! The shared form used by the new-income and edit-income pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    category::{Category, CategoryId},
    currency::Currency,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE},
    recurrence::Recurrence,
};

/// The form data for creating or editing an income.
#[derive(Debug, Deserialize)]
pub struct IncomeForm {
    /// The amount received each occurrence.
    pub amount: Decimal,
    /// The currency of the amount.
    pub currency: Currency,
    /// The anchor date of the income.
    pub date: Date,
    /// What the income is for.
    pub description: String,
    /// The category the income belongs to.
    pub category_id: CategoryId,
    /// How often the income repeats.
    pub recurring: Recurrence,
    /// When the income expires. An empty form field means no expiration.
    #[serde(default, deserialize_with = "empty_string_as_none_date")]
    pub expiration_date: Option<Date>,
}

const DATE_INPUT_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Deserialize an optional date form field, treating the empty string a
/// browser submits for a blank `<input type="date">` as `None`.
fn empty_string_as_none_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => Date::parse(value, DATE_INPUT_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// The values to pre-fill the income form with.
#[derive(Debug, Default)]
pub struct IncomeFormValues {
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub date: Option<Date>,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub recurring: Option<Recurrence>,
    pub expiration_date: Option<Date>,
}

impl From<&crate::income::Income> for IncomeFormValues {
    fn from(income: &crate::income::Income) -> Self {
        Self {
            amount: Some(income.amount),
            currency: Some(income.currency),
            date: Some(income.date),
            description: income.description.clone(),
            category_id: Some(income.category_id),
            recurring: Some(income.recurring),
            expiration_date: income.expiration_date,
        }
    }
}

/// Render the income form.
///
/// `hx_attribute` selects the HTMX verb ("hx-post" for create, "hx-put" for
/// edit) and `endpoint` the URL the form is submitted to.
pub fn income_form(
    values: &IncomeFormValues,
    categories: &[Category],
    hx_attribute: &str,
    endpoint: &str,
    submit_label: &str,
) -> Markup {
    let amount_value = values
        .amount
        .map(|amount| amount.to_string())
        .unwrap_or_default();
    let date_value = values.date.map(date_input_value).unwrap_or_default();
    let expiration_value = values
        .expiration_date
        .map(date_input_value)
        .unwrap_or_default();
    let selected_currency = values.currency.unwrap_or(Currency::Usd);
    let selected_recurrence = values.recurring.unwrap_or(Recurrence::None);

    html!(
        form
            hx-post=[(hx_attribute == "hx-post").then_some(endpoint)]
            hx-put=[(hx_attribute == "hx-put").then_some(endpoint)]
            hx-target-4xx="this"
            hx-target-5xx="this"
            hx-swap="beforebegin"
            class="space-y-4 w-full max-w-md"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(amount_value);
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select name="currency" id="currency" class=(FORM_SELECT_STYLE) required
                {
                    @for currency in Currency::ALL {
                        option
                            value=(currency.code())
                            selected[currency == selected_currency]
                        {
                            (currency.code()) " - " (currency.label())
                        }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(date_value);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    maxlength="150"
                    placeholder="e.g. Salary"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.description);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category_id" id="category_id" class=(FORM_SELECT_STYLE) required
                {
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[Some(category.id) == values.category_id]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="recurring" class=(FORM_LABEL_STYLE) { "Recurrence" }

                select name="recurring" id="recurring" class=(FORM_SELECT_STYLE) required
                {
                    @for recurrence in Recurrence::ALL {
                        option
                            value=(recurrence.code())
                            selected[recurrence == selected_recurrence]
                        {
                            (recurrence.label())
                        }
                    }
                }
            }

            div
            {
                label for="expiration_date" class=(FORM_LABEL_STYLE) { "Expires (optional)" }

                input
                    type="date"
                    name="expiration_date"
                    id="expiration_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(expiration_value);

                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "No occurrence will be generated after this date."
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    )
}

fn date_input_value(date: Date) -> String {
    date.format(DATE_INPUT_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
