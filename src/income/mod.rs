mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod incomes_page;

pub use core::{
    Income, IncomeBuilder, create_income, create_income_table, get_income, get_incomes,
    get_incomes_for_window, map_income_row,
};
pub use create_endpoint::create_income_endpoint;
pub use create_page::get_create_income_page;
pub use delete_endpoint::delete_income_endpoint;
pub use edit_endpoint::edit_income_endpoint;
pub use edit_page::get_edit_income_page;
pub use incomes_page::get_incomes_page;
