//! Defines the core data model and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::ExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// Money a user spent on something.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// A short description of what the money was spent on, e.g. "Coffee".
    pub title: String,
    /// How much money was spent.
    pub amount: f64,
    /// A free text label used to group expenses, e.g. "Food".
    pub category: String,
    /// The ID of the user that owns this expense.
    pub user_id: UserID,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(title: &str, amount: f64, category: &str) -> ExpenseBuilder {
        ExpenseBuilder {
            title: title.to_owned(),
            amount,
            category: category.to_owned(),
        }
    }
}

/// The fields of an [Expense] that are not yet in the database.
///
/// Pass the builder to [create_expense] along with the owner's ID.
///
/// # Examples
///
/// ```ignore
/// let expense = create_expense(Expense::build("Coffee", 3.5, "Food"), user_id, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct ExpenseBuilder {
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much money was spent.
    pub amount: f64,
    /// A free text label used to group expenses.
    pub category: String,
}

impl ExpenseBuilder {
    /// Check the text a user entered for a new expense.
    ///
    /// Title and category are trimmed of surrounding whitespace, and the amount
    /// is parsed as a finite decimal number.
    ///
    /// # Errors
    /// Returns an [Error::EmptyField] if the title or category is blank, or an
    /// [Error::InvalidAmount] if `raw_amount` is not a number.
    pub fn parse(title: &str, raw_amount: &str, category: &str) -> Result<Self, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyField("Title"));
        }

        let amount = match raw_amount.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => amount,
            _ => return Err(Error::InvalidAmount(raw_amount.to_owned())),
        };

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyField("Category"));
        }

        Ok(Expense::build(title, amount, category))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_id ON expense(user_id)",
        (),
    )?;

    Ok(())
}

/// Create a new expense owned by `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    builder: ExpenseBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (title, amount, category, user_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, title, amount, category, user_id",
        )?
        .query_row(
            (
                builder.title,
                builder.amount,
                builder.category,
                user_id.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownUser(user_id),
            error => error.into(),
        })?;

    Ok(expense)
}

/// Get all of the expenses owned by `user_id`, oldest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_expenses_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, title, amount, category, user_id FROM expense
             WHERE user_id = :user_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Get the number of expenses in the database across all users.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_expenses(connection: &Connection) -> Result<usize, Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))?;

    usize::try_from(count)
        .map_err(|_| Error::SqlError(rusqlite::Error::IntegralValueOutOfRange(0, count)))
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        user_id: UserID::new(row.get(4)?),
    })
}

#[cfg(test)]
mod parse_tests {
    use crate::{Error, expense::Expense};

    use super::ExpenseBuilder;

    #[test]
    fn parses_valid_fields() {
        let got = ExpenseBuilder::parse(" Coffee ", "3.50", " Food ");

        assert_eq!(got, Ok(Expense::build("Coffee", 3.5, "Food")));
    }

    #[test]
    fn accepts_whole_and_zero_amounts() {
        assert_eq!(
            ExpenseBuilder::parse("Rent", "450", "Housing").map(|builder| builder.amount),
            Ok(450.0)
        );
        assert_eq!(
            ExpenseBuilder::parse("Freebie", "0", "Misc").map(|builder| builder.amount),
            Ok(0.0)
        );
    }

    #[test]
    fn rejects_non_numeric_amount() {
        assert_eq!(
            ExpenseBuilder::parse("Coffee", "abc", "Food"),
            Err(Error::InvalidAmount("abc".to_owned()))
        );
    }

    #[test]
    fn rejects_non_finite_amount() {
        assert_eq!(
            ExpenseBuilder::parse("Coffee", "inf", "Food"),
            Err(Error::InvalidAmount("inf".to_owned()))
        );
        assert_eq!(
            ExpenseBuilder::parse("Coffee", "NaN", "Food"),
            Err(Error::InvalidAmount("NaN".to_owned()))
        );
    }

    #[test]
    fn rejects_blank_title() {
        assert_eq!(
            ExpenseBuilder::parse("  ", "3.50", "Food"),
            Err(Error::EmptyField("Title"))
        );
    }

    #[test]
    fn rejects_blank_category() {
        assert_eq!(
            ExpenseBuilder::parse("Coffee", "3.50", ""),
            Err(Error::EmptyField("Category"))
        );
    }
}
