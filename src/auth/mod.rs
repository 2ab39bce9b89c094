//! User accounts, passwords and cookie based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub(crate) use log_in::{get_log_in_page, post_log_in};
pub(crate) use log_out::get_log_out;
pub(crate) use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use register_user::{get_register_page, register_user};
pub(crate) use token::Token;
pub use user::{
    User, UserID, Username, count_users, create_user, create_user_table, get_user_by_id,
    get_user_by_username, update_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub(crate) use log_in::INVALID_CREDENTIALS_ERROR_MSG;
