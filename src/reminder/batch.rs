//! Walks every active income and sends reminders for those due tomorrow.

use std::collections::HashMap;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    income::{Income, map_income_row},
    profile::get_profile,
    user::UserID,
};

use super::{
    selector::is_due_tomorrow,
    sender::{ReminderSender, TemplateVariables},
};

/// What happened during one reminder run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReminderRunSummary {
    /// Incomes that were due tomorrow.
    pub due: usize,
    /// Reminders handed to the provider successfully.
    pub sent: usize,
    /// Due incomes skipped because their owner has no reminder profile.
    pub missing_profile: usize,
    /// Due incomes whose delivery the provider rejected.
    pub failed: usize,
}

/// Send a reminder for every income that lands tomorrow.
///
/// Faults are isolated per record: a missing profile is logged as a
/// warning and skipped, a delivery failure is logged with the provider's
/// error code and skipped, and in both cases the rest of the batch keeps
/// going. Each due income gets at most one delivery attempt; there are no
/// retries.
///
/// `today` is supplied by the caller (the CLI passes the current date in
/// the configured timezone) so runs are reproducible in tests.
///
/// # Errors
/// Returns a [Error::SqlError] only if the income query itself fails;
/// per-record faults never surface here.
pub fn send_due_reminders(
    connection: &Connection,
    today: Date,
    sender: &dyn ReminderSender,
) -> Result<ReminderRunSummary, Error> {
    let candidates = get_reminder_candidates(today, connection)?;
    let mut summary = ReminderRunSummary::default();
    let mut profiles: HashMap<UserID, Option<String>> = HashMap::new();

    for candidate in &candidates {
        if !is_due_tomorrow(&candidate.income, today) {
            continue;
        }
        summary.due += 1;

        let whatsapp_number = profiles
            .entry(candidate.income.user_id)
            .or_insert_with(|| match get_profile(candidate.income.user_id, connection) {
                Ok(profile) => Some(profile.whatsapp_number),
                Err(Error::NotFound) => None,
                Err(error) => {
                    tracing::error!(
                        "could not load profile for user {}: {error}",
                        candidate.income.user_id
                    );
                    None
                }
            });

        let Some(whatsapp_number) = whatsapp_number else {
            tracing::warn!(
                "profile missing for user {}, skipping income #{}",
                candidate.income.user_id,
                candidate.income.id
            );
            summary.missing_profile += 1;
            continue;
        };

        let variables = TemplateVariables::new(
            &candidate.income,
            &candidate.recipient_name,
            candidate.category_name.as_deref(),
        );
        let to = format!("whatsapp:{whatsapp_number}");

        match sender.send(&to, &variables) {
            Ok(delivery_id) => {
                tracing::info!(
                    "reminder sent for income #{} to {to}, delivery id {delivery_id}",
                    candidate.income.id
                );
                summary.sent += 1;
            }
            Err(error) => {
                tracing::error!(
                    "delivery failed for income #{} with code {}: {}",
                    candidate.income.id,
                    error.code,
                    error.message
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

struct ReminderCandidate {
    income: Income,
    recipient_name: String,
    category_name: Option<String>,
}

/// Load every user's active incomes that have not expired before `today`,
/// together with the owner's display name and the category label.
///
/// Rows that cannot be mapped (e.g. a corrupt recurrence tag) are skipped
/// with a warning so one bad row cannot stop the whole batch.
fn get_reminder_candidates(
    today: Date,
    connection: &Connection,
) -> Result<Vec<ReminderCandidate>, Error> {
    let mut statement = connection.prepare(
        "SELECT i.id, i.amount, i.currency, i.date, i.description, i.recurring,
                i.expiration_date, i.category_id, i.user_id, u.email, c.name
         FROM income i
         INNER JOIN user u ON u.id = i.user_id
         LEFT JOIN category c ON c.id = i.category_id
         WHERE i.is_deleted = 0
           AND (i.expiration_date IS NULL OR i.expiration_date >= :today)
         ORDER BY i.user_id ASC, i.id ASC",
    )?;

    let candidates = statement
        .query_map(&[(":today", &today)], |row| {
            let income = map_income_row(row)?;
            let email: String = row.get(9)?;
            let category_name: Option<String> = row.get(10)?;

            Ok(ReminderCandidate {
                income,
                // Greet users by the mailbox part of their email address.
                recipient_name: email
                    .split_once('@')
                    .map(|(name, _)| name.to_owned())
                    .unwrap_or(email),
                category_name,
            })
        })?
        .filter_map(|candidate_result| match candidate_result {
            Ok(candidate) => Some(candidate),
            Err(error) => {
                tracing::warn!("skipping unreadable income row: {error}");
                None
            }
        })
        .collect();

    Ok(candidates)
}
