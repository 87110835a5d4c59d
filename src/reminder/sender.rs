//! The outbound notification collaborator.
//!
//! The actual WhatsApp provider lives outside this crate; everything here
//! is the seam it plugs into. [TemplateVariables] carries the fields the
//! provider's message template expects, numbered the way content templates
//! number their placeholders.

use rust_decimal::Decimal;

use crate::{currency::Currency, income::Income};

/// The values substituted into the reminder message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    /// Who the reminder greets.
    pub recipient_name: String,
    /// The amount formatted to two decimal places.
    pub amount: String,
    /// The currency code of the amount.
    pub currency: String,
    /// The category name, or "General" if the category is unknown.
    pub category: String,
    /// The income description, or "No description".
    pub description: String,
}

impl TemplateVariables {
    /// Build the template variables for one income.
    ///
    /// Missing category names and empty descriptions fall back to fixed
    /// labels so the rendered message never has holes.
    pub fn new(income: &Income, recipient_name: &str, category_name: Option<&str>) -> Self {
        Self {
            recipient_name: recipient_name.to_owned(),
            amount: format_two_decimals(income.amount),
            currency: income.currency.code().to_owned(),
            category: category_name.unwrap_or("General").to_owned(),
            description: if income.description.is_empty() {
                "No description".to_owned()
            } else {
                income.description.clone()
            },
        }
    }

    /// Serialize the variables as the numbered JSON object the provider's
    /// content template expects.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "1": self.recipient_name,
            "2": self.amount,
            "3": self.currency,
            "4": self.category,
            "5": self.description,
        })
        .to_string()
    }
}

fn format_two_decimals(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// A delivery failure reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery failed with code {code}: {message}")]
pub struct SendError {
    /// The provider's error code, logged for operators.
    pub code: String,
    /// The provider's human readable error message.
    pub message: String,
}

/// Something that can deliver one reminder message.
///
/// Implementations must attempt delivery at most once per call; retries
/// are the operator's concern, not the batch's.
pub trait ReminderSender {
    /// Deliver the reminder to `to`, returning the provider's delivery
    /// identifier.
    fn send(&self, to: &str, variables: &TemplateVariables) -> Result<String, SendError>;
}

/// A sender that logs the payload instead of delivering it.
///
/// Used by the `send_reminders` binary until a real provider is wired in,
/// and handy for dry runs against production data.
#[derive(Debug, Default)]
pub struct LoggingSender;

impl ReminderSender for LoggingSender {
    fn send(&self, to: &str, variables: &TemplateVariables) -> Result<String, SendError> {
        tracing::info!("reminder for {to}: {}", variables.to_json());

        Ok(format!("logged-{to}"))
    }
}

#[cfg(test)]
mod template_variables_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{currency::Currency, income::Income, recurrence::Recurrence, user::UserID};

    use super::TemplateVariables;

    fn test_income(amount: rust_decimal::Decimal, description: &str) -> Income {
        Income {
            id: 1,
            amount,
            currency: Currency::Jod,
            date: date!(2024 - 01 - 15),
            description: description.to_owned(),
            recurring: Recurrence::Monthly,
            expiration_date: None,
            category_id: 1,
            user_id: UserID::new(1),
        }
    }

    #[test]
    fn amount_has_two_decimal_places() {
        let income = test_income(dec!(1234.5), "Salary");

        let variables = TemplateVariables::new(&income, "sami", Some("Work"));

        assert_eq!(variables.amount, "1234.50");
        assert_eq!(variables.currency, "JOD");
        assert_eq!(variables.category, "Work");
    }

    #[test]
    fn missing_category_and_description_fall_back() {
        let income = test_income(dec!(10), "");

        let variables = TemplateVariables::new(&income, "sami", None);

        assert_eq!(variables.category, "General");
        assert_eq!(variables.description, "No description");
    }

    #[test]
    fn json_uses_numbered_keys() {
        let income = test_income(dec!(10.00), "Salary");

        let json = TemplateVariables::new(&income, "sami", Some("Work")).to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["1"], "sami");
        assert_eq!(parsed["2"], "10.00");
        assert_eq!(parsed["3"], "JOD");
        assert_eq!(parsed["4"], "Work");
        assert_eq!(parsed["5"], "Salary");
    }
}
