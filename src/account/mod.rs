//! Club bank accounts and their authoritative balances.

mod core;

pub(crate) use core::apply_balance_change;
pub use core::{Account, create_account, create_account_table, get_account, get_accounts};
