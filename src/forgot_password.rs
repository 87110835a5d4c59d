//! The page describing how to reset a forgotten password.

use axum::{http::StatusCode, response::Response};
use maud::html;

use crate::{
    html::{PAGE_CONTAINER_STYLE, base, link},
    shared_templates::render,
};

/// Renders a page describing how the user's password can be reset.
///
/// There is no email reset flow; whoever runs the server resets passwords
/// with the `reset_password` command line tool.
pub async fn get_forgot_password_page() -> Response {
    let content = html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Forgot your password?" }

                p
                {
                    "Passwords are reset from the server itself. Ask whoever \
                    hosts this instance to run the "
                    code { "reset_password" }
                    " tool with your email address, then sign in with your \
                    new password."
                }

                p { (link(crate::endpoints::LOG_IN_VIEW, "Back to log in")) }
            }
        }
    );

    render(StatusCode::OK, base("Forgot Password", &[], &content))
}
