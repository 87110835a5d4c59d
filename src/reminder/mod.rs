//! Reminders for incomes landing tomorrow.
//!
//! The selector decides whether a single income is due; the batch walks
//! every active income, builds the message template variables, and hands
//! them to a [ReminderSender]. One record's failure never stops the rest
//! of the batch.

mod batch;
mod selector;
mod sender;

pub use batch::{ReminderRunSummary, send_due_reminders};
pub use selector::is_due_tomorrow;
pub use sender::{LoggingSender, ReminderSender, SendError, TemplateVariables};
