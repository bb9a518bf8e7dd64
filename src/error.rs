//! Defines the crate level error type.
use time::Date;

use crate::database_id::{AccountId, TransactionId};

/// The errors that may occur when storing transactions or building statements.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The start of a statement window falls after its end.
    ///
    /// Windows are checked before any balances are computed.
    #[error("the window start {start} is after the window end {end}")]
    InvalidWindow {
        /// The requested first day of the window.
        start: Date,
        /// The requested last day of the window.
        end: Date,
    },

    /// A preset window around this date would extend past the supported
    /// calendar range.
    #[error("no window can be built around {0}, it is too close to the end of the calendar")]
    WindowOutOfRange(Date),

    /// The account metadata could not be found.
    ///
    /// Statements are never built against an assumed zero balance, so callers
    /// should check that the account ID is correct.
    #[error("no account with the ID {0} exists")]
    UnknownAccount(AccountId),

    /// A stored transaction could not be used for balance computation, e.g.
    /// it has a negative amount or an unrecognised type.
    ///
    /// These are logged and skipped when reading a ledger, they only surface
    /// to callers that ask for a single transaction.
    #[error("transaction {id} is malformed: {reason}")]
    MalformedTransaction {
        /// The ID of the offending transaction.
        id: TransactionId,
        /// What is wrong with the transaction.
        reason: String,
    },

    /// A transaction was written with an amount that is not allowed.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The specified account label already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountLabel(String),

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
