//! Cookie based session authentication.
//!
//! A successful log-in sets a pair of private (encrypted and signed)
//! cookies: the user's ID and the session expiry. The guard middleware
//! validates them on every protected request, injects the [UserID] as a
//! request extension, and keeps the session alive while the user is
//! active.

mod cookie;
mod middleware;
mod redirect;

pub use cookie::{
    COOKIE_EXPIRY, COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, get_valid_session,
    invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};

pub use crate::user::UserID;
