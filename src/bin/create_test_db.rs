use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Month};

use club_ledger::{
    SQLiteTransactionStore, Transaction, TransactionStatus, TransactionStore, TransactionType,
    initialize_db, setup_logging,
};

/// A utility for creating a test database for club_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

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

    let mut store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));

    println!("Creating test accounts...");

    let savings = store.create_account("Club Savings", Decimal::new(1000_00, 2))?;
    let tour = store.create_account("Tour Fund", Decimal::ZERO)?;

    println!("Creating test transactions...");

    let samples = [
        (
            savings.id,
            TransactionType::Income,
            200_00,
            (Month::January, 5),
            "Subscriptions",
            Some("Members"),
        ),
        (
            savings.id,
            TransactionType::Expense,
            50_00,
            (Month::January, 10),
            "Match balls",
            Some("Sports Depot"),
        ),
        (
            savings.id,
            TransactionType::Income,
            10_00,
            (Month::January, 10),
            "Raffle",
            None,
        ),
        (
            savings.id,
            TransactionType::Expense,
            5_00,
            (Month::January, 10),
            "Raffle prizes",
            None,
        ),
        (
            savings.id,
            TransactionType::Income,
            300_00,
            (Month::January, 20),
            "Sponsorship",
            Some("Corner Bakery"),
        ),
        (
            savings.id,
            TransactionType::Expense,
            120_50,
            (Month::February, 3),
            "Court hire",
            Some("City Council"),
        ),
        (
            tour.id,
            TransactionType::Income,
            450_00,
            (Month::February, 14),
            "Tour deposits",
            Some("Members"),
        ),
    ];

    for (account_id, kind, cents, (month, day), description, counterparty) in samples {
        store.create(
            Transaction::build(
                account_id,
                kind,
                Decimal::new(cents, 2),
                Date::from_calendar_date(2025, month, day)?,
                description,
            )
            .counterparty(counterparty),
        )?;
    }

    store.create(
        Transaction::build(
            savings.id,
            TransactionType::Expense,
            Decimal::new(80_00, 2),
            Date::from_calendar_date(2025, Month::February, 20)?,
            "Coach travel",
        )
        .status(TransactionStatus::Pending),
    )?;

    println!("Success!");

    Ok(())
}
