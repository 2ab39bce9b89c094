//! Expenses recorded by users and the endpoint for adding them.

mod core;
mod create_endpoint;

pub use core::{
    Expense, ExpenseBuilder, count_expenses, create_expense, create_expense_table,
    get_expenses_by_user,
};
pub(crate) use create_endpoint::{ExpenseForm, add_expense, expense_form};
