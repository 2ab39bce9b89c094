//! The registration page for creating a new user account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{Username, create_user},
    endpoints,
    flash::set_flash,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, username_input},
};

pub(crate) const REGISTRATION_SUCCESS_MSG: &str = "Registration successful. Please log in.";

#[derive(Default)]
struct FormErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
}

fn registration_form(username: &str, errors: FormErrors) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER)
            class="space-y-4 md:space-y-6"
        {
            (username_input(username, errors.username))
            (password_input(errors.password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

fn registration_page(username: &str, errors: FormErrors) -> Response {
    let registration_form = registration_form(username, errors);
    let content = log_in_register("Create an account", None, &registration_form);

    base("Register", &[], &content).into_response()
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_page("", FormErrors::default())
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The bcrypt cost used when hashing the new user's password.
    pub password_hash_cost: u32,
    /// The database connection the new user is written to.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and use the default hashing cost.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            password_hash_cost: PasswordHash::DEFAULT_COST,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name the user wants to log in with.
    pub username: String,
    /// The password the user wants to log in with.
    pub password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success a flash message is queued for the log-in page and the client is redirected there.
/// Otherwise the registration page is shown again with an error message on the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = match Username::new(&user_data.username) {
        Ok(username) => username,
        Err(error) => {
            let message = error.to_string();
            return registration_page(
                &user_data.username,
                FormErrors {
                    username: Some(&message),
                    ..Default::default()
                },
            );
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_page(
                username.as_ref(),
                FormErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            );
        }
    };

    let password_hash = match PasswordHash::new(validated_password, state.password_hash_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_response();
        }
    };

    let user = match state.db_connection.lock() {
        Ok(connection) => create_user(username.clone(), password_hash, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match user {
        Ok(user) => {
            tracing::info!("Registered user {} with ID {}", user.username, user.id);
            (
                set_flash(jar, REGISTRATION_SUCCESS_MSG),
                Redirect::to(endpoints::LOG_IN),
            )
                .into_response()
        }
        Err(error @ Error::DuplicateUsername(_)) => {
            let message = error.to_string();
            registration_page(
                username.as_ref(),
                FormErrors {
                    username: Some(&message),
                    ..Default::default()
                },
            )
        }
        Err(error) => {
            tracing::error!("could not create user {username}: {error}");
            error.into_response()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        auth::{Username, count_users, create_user_table, get_user_by_username},
        endpoints,
        flash::COOKIE_FLASH,
        test_utils::{assert_form_error_message, assert_form_input_with_value, must_get_form},
    };

    use super::{RegistrationState, register_user};

    fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        let connection = Arc::new(Mutex::new(connection));

        let mut state = RegistrationState::new("foobar", connection.clone());
        state.password_hash_cost = 4;

        let app = Router::new()
            .route(endpoints::REGISTER, post(register_user))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            connection,
        )
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let (server, connection) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[("username", "alice"), ("password", "pw1")])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
        let flash_cookie = response.cookie(COOKIE_FLASH);
        assert!(!flash_cookie.value().is_empty());

        let connection = connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert_eq!(user.username, Username::new_unchecked("alice"));
        assert!(user.password_hash.verify("pw1").unwrap());
        assert_ne!(user.password_hash.as_ref(), "pw1");
    }

    #[tokio::test]
    async fn register_user_trims_username() {
        let (server, connection) = get_test_server();

        server
            .post(endpoints::REGISTER)
            .form(&[("username", "  alice  "), ("password", "pw1")])
            .await
            .assert_status_see_other();

        let connection = connection.lock().unwrap();
        assert!(get_user_by_username("alice", &connection).is_ok());
    }

    #[tokio::test]
    async fn register_user_fails_on_duplicate_username() {
        let (server, connection) = get_test_server();
        server
            .post(endpoints::REGISTER)
            .form(&[("username", "alice"), ("password", "pw1")])
            .await
            .assert_status_see_other();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[("username", "alice"), ("password", "pw2")])
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        let form = must_get_form(&document);
        assert_form_error_message(&form, "the username \"alice\" is already taken");
        assert_form_input_with_value(&form, "username", "text", "alice");

        let connection = connection.lock().unwrap();
        assert_eq!(count_users(&connection), Ok(1));
        let user = get_user_by_username("alice", &connection).unwrap();
        assert!(user.password_hash.verify("pw1").unwrap());
    }

    #[tokio::test]
    async fn register_user_fails_on_blank_username() {
        let (server, connection) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[("username", "   "), ("password", "pw1")])
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        let form = must_get_form(&document);
        assert_form_error_message(&form, "Username cannot be empty");
        assert_eq!(count_users(&connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_user_fails_on_empty_password() {
        let (server, connection) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[("username", "alice"), ("password", "")])
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        let form = must_get_form(&document);
        assert_form_error_message(&form, "Password cannot be empty");
        assert_eq!(count_users(&connection.lock().unwrap()), Ok(0));
    }
}
