//! The URIs of the app's routes.

/// The dashboard, the landing page for logged in users.
pub const ROOT: &str = "/";
/// The route for getting the log in page and submitting the log in form.
pub const LOG_IN: &str = "/login";
/// The route for getting the registration page and submitting the registration form.
pub const REGISTER: &str = "/register";
/// The route for recording a new expense.
pub const ADD_EXPENSE: &str = "/add-expense";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
