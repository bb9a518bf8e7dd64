//! The statement engine.
//!
//! A statement is derived in full from an account and its ledger every time
//! it is needed:
//! 1. the ledger is sorted by date and projected forward from the initial
//!    balance ([projection]),
//! 2. the lines inside the requested [StatementWindow] are selected
//!    ([window]),
//! 3. their balances are re-derived backwards from the account's
//!    authoritative current balance, newest first ([reconcile]).
//!
//! Nothing here performs I/O, [load_statement] fetches through a
//! [TransactionStore](crate::stores::TransactionStore) before calling into the
//! engine.

pub mod projection;
pub mod reconcile;
pub mod statement;
pub mod window;

#[cfg(test)]
mod test_utils;

pub use projection::{StatementLine, project_balances, project_ledger, sort_ledger};
pub use reconcile::{BalanceDrift, detect_drift, reconcile_window};
pub use statement::{Statement, StatementRequest, assemble_statement, load_statement};
pub use window::{Dated, StatementWindow, WindowPreset, compute_window, filter_window};
