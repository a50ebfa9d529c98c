use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use expense_tracker::{NewTransaction, PasswordHash, create_transaction, create_user, initialize_db};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has one user `test` with the password `test` and a month of transactions.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::from_raw_password("test", PasswordHash::DEFAULT_COST)?;
    let user = create_user("test", password_hash, &conn)?;

    println!("Creating transactions...");

    let transactions = [
        NewTransaction::new(4200.0, "income", "salary", date!(2024 - 01 - 01)),
        NewTransaction::new(1500.0, "expense", "rent", date!(2024 - 01 - 02))
            .description("January rent"),
        NewTransaction::new(86.4, "expense", "food", date!(2024 - 01 - 05))
            .description("Groceries"),
        NewTransaction::new(12.5, "expense", "food", date!(2024 - 01 - 09)).description("Lunch"),
        NewTransaction::new(60.0, "expense", "transport", date!(2024 - 01 - 12)),
        NewTransaction::new(250.0, "income", "freelance", date!(2024 - 01 - 20)),
        NewTransaction::new(500.0, "transfer", "savings", date!(2024 - 01 - 25))
            .description("Not counted in the summary"),
        NewTransaction::new(93.1, "expense", "food", date!(2024 - 01 - 28))
            .description("Groceries"),
    ];

    for transaction in transactions {
        create_transaction(user.id, transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
