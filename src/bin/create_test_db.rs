use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use expense_tracker::{
    Expense, PasswordHash, Username, ValidatedPassword, create_expense, create_user, initialize_db,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    println!("Creating expenses for {}...", user.username);

    for (title, amount, category) in [
        ("Groceries", 84.20, "Food"),
        ("Coffee", 4.50, "Food"),
        ("Bus pass", 50.00, "Transport"),
        ("Rent", 450.00, "Housing"),
        ("Movie tickets", 32.00, "Entertainment"),
    ] {
        create_expense(Expense::build(title, amount, category), user.id, &conn)?;
    }

    println!("Success!");

    Ok(())
}
