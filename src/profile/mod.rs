mod core;
mod profile_page;
mod update_endpoint;

pub use core::{UserProfile, create_user_profile_table, get_profile, upsert_profile};
pub use profile_page::get_profile_page;
pub use update_endpoint::update_profile_endpoint;
