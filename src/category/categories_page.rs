//! Displays the user's categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    user::UserID,
};

use super::core::get_categories;

/// The state needed for the [get_categories_page] route handler.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct CategoryTableRow {
    name: String,
    edit_url: String,
    delete_url: String,
}

fn categories_view(categories: &[CategoryTableRow]) -> Markup {
    let create_category_page_url = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |category: &CategoryTableRow| {
        let action_links = edit_delete_action_links(
            &category.edit_url,
            &category.delete_url,
            &format!(
                "Are you sure you want to delete the category '{}'? \
                Incomes keep the category but it disappears from forms.",
                category.name
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
                    (category.name)
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
            section class="space-y-4 w-full max-w-2xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(create_category_page_url) class=(LINK_STYLE)
                    {
                        "Add Category"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for category in categories {
                                (table_row(category))
                            }

                            @if categories.is_empty() {
                                tr
                                {
                                    td
                                        colspan="2"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories found. Create a category "
                                        a href=(create_category_page_url) class=(LINK_STYLE)
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

    base("Categories", &[], &content)
}

/// Renders the categories page showing the user's active categories.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories: Vec<CategoryTableRow> = get_categories(user_id, false, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?
        .into_iter()
        .map(|category| CategoryTableRow {
            name: category.name.to_string(),
            edit_url: format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
            delete_url: format_endpoint(endpoints::DELETE_CATEGORY, category.id),
        })
        .collect();

    Ok(categories_view(&categories).into_response())
}

#[cfg(test)]
mod categories_template_tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::assert_valid_html,
    };

    use super::{CategoryTableRow, categories_view};

    #[test]
    fn renders_category_rows() {
        let rows = vec![
            CategoryTableRow {
                name: "Rent".to_owned(),
                edit_url: format_endpoint(endpoints::EDIT_CATEGORY_VIEW, 1),
                delete_url: format_endpoint(endpoints::DELETE_CATEGORY, 1),
            },
            CategoryTableRow {
                name: "Salary".to_owned(),
                edit_url: format_endpoint(endpoints::EDIT_CATEGORY_VIEW, 2),
                delete_url: format_endpoint(endpoints::DELETE_CATEGORY, 2),
            },
        ];

        let rendered = categories_view(&rows).into_string();

        let html = Html::parse_document(&rendered);
        assert_valid_html(&html);
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);
    }

    #[test]
    fn no_data_links_to_create_page() {
        let rendered = categories_view(&[]).into_string();

        let html = Html::parse_document(&rendered);
        let link_selector = Selector::parse("td[colspan='2'] a").unwrap();
        let link = html.select(&link_selector).next().unwrap();
        assert_eq!(link.attr("href"), Some(endpoints::NEW_CATEGORY_VIEW));
    }
}
