//! Dashboard HTTP handlers and view rendering.

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
    auth::{UserID, Username, get_user_by_id},
    dashboard::{
        charts::{DashboardChart, charts_script, charts_view},
        tables::expenses_table,
    },
    endpoints,
    expense::{Expense, ExpenseForm, expense_form, get_expenses_by_user},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The ECharts build served from the static directory.
const ECHARTS_SCRIPT: &str = "echarts.5.5.1.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the logged in user's expenses and the form for adding a new one.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    dashboard_page(user_id, &ExpenseForm::default(), None, &connection)
        .map(IntoResponse::into_response)
}

/// Render the dashboard for `user_id`.
///
/// `form` and `form_error` are shown in the add-expense form, which lets a
/// rejected submission be shown again with the user's input.
///
/// # Errors
/// Returns an error if the user or their expenses could not be read from the database.
pub(crate) fn dashboard_page(
    user_id: UserID,
    form: &ExpenseForm,
    form_error: Option<&str>,
    connection: &Connection,
) -> Result<Markup, Error> {
    let user = get_user_by_id(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
    let expenses = get_expenses_by_user(user_id, connection).inspect_err(|error| {
        tracing::error!("could not get expenses for user {user_id}: {error}")
    })?;

    Ok(dashboard_view(
        &user.username,
        &expenses,
        expense_form(form, form_error),
    ))
}

/// Renders the dashboard page.
///
/// The chart and table are replaced by a prompt when `expenses` is empty.
fn dashboard_view(username: &Username, expenses: &[Expense], form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT).into_html();
    let charts = if expenses.is_empty() {
        Vec::new()
    } else {
        vec![DashboardChart::expenses(expenses)]
    };

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl gap-8"}
        {
            header class="w-full"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Logged in as " span id="username" class="font-semibold" { (username.as_ref()) }
                }
            }

            div class="grid w-full grid-cols-1 lg:grid-cols-3 gap-8"
            {
                section id="add-expense" class="lg:col-span-1"
                {
                    h3 class="text-xl font-semibold mb-4" { "Add an expense" }
                    (form)
                }

                div class="lg:col-span-2 flex flex-col gap-8"
                {
                    @if expenses.is_empty() {
                        (no_expenses_view())
                    } @else {
                        (charts_view(&charts))
                        (expenses_table(expenses))
                    }
                }
            }
        }
    );

    let mut head_elements = vec![dollar_input_styles()];
    if !charts.is_empty() {
        head_elements.push(HeadElement::ScriptLink(format!(
            "{}/{ECHARTS_SCRIPT}",
            endpoints::STATIC
        )));
        head_elements.push(charts_script(&charts));
    }

    base("Dashboard", &head_elements, &content)
}

fn no_expenses_view() -> Markup {
    html!(
        div id="no-expenses" class="flex flex-col items-center text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your expenses and a chart of your spending will show up here
                once you add an expense."
            }
        }
    )
}
