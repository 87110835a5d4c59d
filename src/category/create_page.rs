//! The page for creating a new category.

use axum::{http::StatusCode, response::Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    shared_templates::render,
};

pub(super) fn category_form(
    name_value: &str,
    hx_attribute: &str,
    endpoint: &str,
    submit_label: &str,
) -> Markup {
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
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="e.g. Salary"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(name_value);

                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Letters, digits, and spaces. Each name can only be used once."
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    )
}

/// Renders the page for creating a new category.
pub async fn get_create_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { "Add Category" }

                (category_form("", "hx-post", endpoints::POST_CATEGORY, "Add Category"))
            }
        }
    );

    render(StatusCode::OK, base("Add Category", &[], &content))
}
