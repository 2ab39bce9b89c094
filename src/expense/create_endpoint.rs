//! The form and endpoint for adding an expense from the dashboard.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::dashboard_page,
    endpoints,
    expense::{ExpenseBuilder, create_expense},
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The state needed for adding an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw text entered by the user in the add-expense form.
///
/// The amount is kept as text so that a bad number can be shown back to the
/// user instead of being rejected by the form extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// What the money was spent on.
    pub title: String,
    /// How much was spent, e.g. "3.50".
    pub amount: String,
    /// The label used to group the expense.
    pub category: String,
}

/// Renders the add-expense form, filled in with `form` and showing `error_message` if set.
pub fn expense_form(form: &ExpenseForm, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::ADD_EXPENSE)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }

                input
                    type="text"
                    name="title"
                    id="title"
                    placeholder="Coffee"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(form.title);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper"
                {
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        step="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                        value=(form.amount);
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    type="text"
                    name="category"
                    id="category"
                    placeholder="Food"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(form.category);
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Add expense"
            }
        }
    }
}

/// Handler for adding an expense for the logged in user via the POST method.
///
/// Redirects to the dashboard on success. If the form data is invalid, the
/// dashboard is shown with a 400 status and the form keeps the user's input.
pub async fn add_expense(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let builder = match ExpenseBuilder::parse(&form.title, &form.amount, &form.category) {
        Ok(builder) => builder,
        Err(error) => {
            tracing::debug!("Rejected expense for user {user_id}: {error}");
            let error_message = error.to_string();

            return match dashboard_page(user_id, &form, Some(&error_message), &connection) {
                Ok(page) => (StatusCode::BAD_REQUEST, page).into_response(),
                Err(error) => error.into_response(),
            };
        }
    };

    match create_expense(builder, user_id, &connection) {
        Ok(expense) => {
            tracing::info!("User {user_id} added expense {}", expense.id);
            Redirect::to(endpoints::ROOT).into_response()
        }
        Err(error) => {
            tracing::error!("Could not add expense for user {user_id}: {error}");
            error.into_response()
        }
    }
}
