//! Builds account statements from a ledger.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    account::Account,
    database_id::AccountId,
    stores::TransactionStore,
    transaction::Transaction,
};

use super::{
    projection::{StatementLine, project_ledger, sort_ledger},
    reconcile::{BalanceDrift, detect_drift, reconcile_window},
    window::StatementWindow,
};

/// The running-balance view of an account over a window, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// The account the statement is for.
    pub account_id: AccountId,
    /// The window that selected the lines.
    pub window: StatementWindow,
    /// The transactions in the window with their balances, newest first.
    pub lines: Vec<StatementLine>,
    /// Set when the ledger does not explain the account's current balance.
    ///
    /// The lines are anchored to the current balance either way.
    pub drift: Option<BalanceDrift>,
}

impl Statement {
    /// The balance after the newest line, or `None` for an empty statement.
    pub fn closing_balance(&self) -> Option<Decimal> {
        self.lines.first().map(|line| line.balance_after)
    }

    /// The balance before the oldest line, or `None` for an empty statement.
    pub fn opening_balance(&self) -> Option<Decimal> {
        self.lines
            .last()
            .map(|line| line.balance_after - line.transaction.signed_amount())
    }
}

/// A request for the statement of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementRequest {
    /// The account to build the statement for.
    pub account_id: AccountId,
    /// The dates to include.
    pub window: StatementWindow,
}

/// Build the statement for `account` from its `transactions`.
///
/// `transactions` may be in any order. Transactions that belong to another
/// account or have a negative amount are logged and left out.
pub fn assemble_statement(
    account: &Account,
    transactions: Vec<Transaction>,
    window: StatementWindow,
) -> Statement {
    let transactions = sort_ledger(
        transactions
            .into_iter()
            .filter(|transaction| is_usable(account, transaction))
            .collect(),
    );

    let ledger = project_ledger(account.initial_balance, transactions);
    let projected = ledger
        .last()
        .map_or(account.initial_balance, |line| line.balance_after);

    let drift = detect_drift(projected, account.current_balance);
    if let Some(drift) = &drift {
        tracing::warn!(
            "Account {} has drifted from its ledger: projected {}, current balance {}, difference {}",
            account.id,
            drift.projected,
            drift.authoritative,
            drift.difference
        );
    }

    let lines = reconcile_window(&ledger, &window, account.current_balance);
    tracing::debug!(
        "Built statement for account {} with {} of {} transactions",
        account.id,
        lines.len(),
        ledger.len()
    );

    Statement {
        account_id: account.id,
        window,
        lines,
        drift,
    }
}

/// Fetch the account and its transactions from `store` and build the
/// statement requested.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownAccount] if the account does not exist,
/// - or any error the store returns while fetching.
pub fn load_statement(
    store: &impl TransactionStore,
    request: &StatementRequest,
) -> Result<Statement, Error> {
    let account = store.get_account(request.account_id)?;
    let transactions = store.list_transactions(request.account_id)?;

    Ok(assemble_statement(&account, transactions, request.window))
}

fn is_usable(account: &Account, transaction: &Transaction) -> bool {
    if transaction.account_id != account.id {
        tracing::warn!(
            "Skipping transaction {} from account {} on the statement for account {}",
            transaction.id,
            transaction.account_id,
            account.id
        );
        return false;
    }

    if transaction.amount < Decimal::ZERO {
        let error = Error::MalformedTransaction {
            id: transaction.id,
            reason: format!("negative amount {}", transaction.amount),
        };
        tracing::warn!("Skipping transaction: {error}");
        return false;
    }

    true
}
