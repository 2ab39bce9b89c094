//! Dashboard module
//!
//! Provides the logged in user's home page: a table of their expenses, a bar
//! chart of the same expenses and the form for adding a new one.

mod charts;
mod handlers;
mod tables;

pub(crate) use handlers::{dashboard_page, get_dashboard_page};
