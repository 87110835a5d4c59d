mod engine;
mod report_page;
mod window;

pub use engine::{Occurrence, Totals, classify, occurrences_in_window, totals};
pub use report_page::get_report_page;
pub use window::MonthWindow;
