//! Alert system for displaying success and error messages to users.
//!
//! This module provides a unified way to display alert messages across the
//! application with proper styling and dismissal functionality.

use maud::{Markup, html};

/// An alert message shown to the user, typically swapped in by HTMX.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something worked and the user should know about it.
    Success {
        /// Short summary shown in bold.
        message: String,
        /// Longer explanation, may be empty.
        details: String,
    },
    /// Something went wrong and the user can likely fix it.
    Error {
        /// Short summary shown in bold.
        message: String,
        /// Longer explanation, may be empty.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "flex items-start gap-3 rounded border border-green-300 bg-green-50 \
                px-4 py-3 text-sm text-green-800 dark:border-green-700 \
                dark:bg-green-900/30 dark:text-green-200",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "flex items-start gap-3 rounded border border-red-300 bg-red-50 \
                px-4 py-3 text-sm text-red-800 dark:border-red-700 \
                dark:bg-red-900/30 dark:text-red-200",
                message,
                details,
            ),
        };

        html!(
            div class=(container_style) role="alert"
            {
                div
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p { (details) }
                    }
                }
            }
        )
    }
}
