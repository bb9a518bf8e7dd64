use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, macros::format_description};

use club_ledger::{
    AccountId, SQLiteTransactionStore, Statement, StatementRequest, StatementWindow,
    TransactionStore, WindowPreset, compute_window, get_accounts, initialize_db, load_statement,
    setup_logging,
};

/// Print the running-balance statement for a club account.
///
/// Without `--account`, lists the accounts in the database instead.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The ID of the account to print the statement for.
    #[arg(short, long)]
    account: Option<AccountId>,

    /// The first date to include, e.g. 2025-01-08.
    #[arg(long, value_parser = parse_date, conflicts_with = "preset")]
    start: Option<Date>,

    /// The last date to include, e.g. 2025-01-31.
    #[arg(long, value_parser = parse_date, conflicts_with = "preset")]
    end: Option<Date>,

    /// Snap the window to the calendar period containing `--anchor`.
    #[arg(long, value_enum)]
    preset: Option<WindowPreset>,

    /// The date the preset window is built around, defaults to today (UTC).
    #[arg(long, value_parser = parse_date, requires = "preset")]
    anchor: Option<Date>,

    /// How to print the statement.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let window = match args.preset {
        Some(preset) => {
            let anchor = args
                .anchor
                .unwrap_or_else(|| OffsetDateTime::now_utc().date());
            compute_window(preset, anchor)?
        }
        None => StatementWindow::new(args.start, args.end)?,
    };

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let Some(account_id) = args.account else {
        for account in get_accounts(&conn)? {
            println!(
                "{:>4}  {:<24} {:>12}",
                account.id,
                account.label,
                money(account.current_balance)
            );
        }
        return Ok(());
    };

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let account = store.get_account(account_id)?;
    let statement = load_statement(&store, &StatementRequest { account_id, window })?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statement)?),
        OutputFormat::Table => print_table(&account.label, &statement),
    }

    Ok(())
}

fn print_table(label: &str, statement: &Statement) {
    println!("{label} ({})", statement.window.label());

    if let Some(drift) = &statement.drift {
        println!(
            "Warning: the current balance is {} but the transactions add up to {} ({} unexplained)",
            money(drift.authoritative),
            money(drift.projected),
            money(drift.difference)
        );
    }

    if statement.lines.is_empty() {
        println!("No transactions in this window.");
        return;
    }

    println!(
        "{:<10}  {:<7}  {:>12}  {:>12}  Description",
        "Date", "Type", "Amount", "Balance"
    );
    for line in &statement.lines {
        let transaction = &line.transaction;
        println!(
            "{:<10}  {:<7}  {:>12}  {:>12}  {}",
            transaction.date,
            transaction.kind,
            money(transaction.amount),
            money(line.balance_after),
            transaction.description
        );
    }

    if let (Some(opening), Some(closing)) =
        (statement.opening_balance(), statement.closing_balance())
    {
        println!(
            "Opening balance {}, closing balance {}",
            money(opening),
            money(closing)
        );
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|error| format!("expected a date like 2025-01-31: {error}"))
}
