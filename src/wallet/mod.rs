// src/wallet/mod.rs

//! Per-agent holdings of USD and the native token.

pub mod balance;
pub mod burn_wallet;
pub mod ledger_wallet;
pub mod local;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::ledger::{Address, SharedLedger};
use balance::{settle_withdraw, validate_deposit};

pub use balance::Balance;
pub use burn_wallet::BurnWallet;
pub use ledger_wallet::LedgerWallet;
pub use local::LocalWallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Token,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Token => write!(f, "TOKEN"),
        }
    }
}

/// The balance interface every agent owns exactly one of.
///
/// Balances never go negative and `total_in` never decreases. `withdraw`
/// returns the amount that really left the wallet, which may differ from the
/// request by float tolerance.
pub trait Wallet: fmt::Debug {
    fn balance(&self, currency: Currency) -> f64;
    fn total_in(&self, currency: Currency) -> f64;
    fn deposit(&mut self, currency: Currency, amount: f64) -> SimResult<()>;
    fn withdraw(&mut self, currency: Currency, amount: f64) -> SimResult<f64>;

    fn usd(&self) -> f64 {
        self.balance(Currency::Usd)
    }

    fn token(&self) -> f64 {
        self.balance(Currency::Token)
    }

    /// What a withdraw of `amount` would remove, without mutating anything.
    fn check_withdraw(&self, currency: Currency, amount: f64) -> SimResult<f64> {
        settle_withdraw(currency, self.balance(currency), amount)
    }

    /// Moves `amount` of `currency` into `dst`. Both sides are validated before
    /// the source is touched, so a failed transfer changes nothing.
    fn transfer(&mut self, dst: &mut dyn Wallet, currency: Currency, amount: f64) -> SimResult<f64> {
        withdraw_then_deposit(self, dst, currency, amount)
    }

    /// The ledger and address holding this wallet's token, for wallets whose
    /// token lives on a shared ledger.
    fn ledger_account(&self) -> Option<(&SharedLedger, &Address)> {
        None
    }

    /// Books token that already arrived at `ledger_account` by a direct
    /// ledger transfer.
    fn credit_ledger_arrival(&mut self, _amount: f64) {}

    fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot {
            usd: self.usd(),
            token: self.token(),
            total_usd_in: self.total_in(Currency::Usd),
            total_token_in: self.total_in(Currency::Token),
        }
    }
}

/// Moves `amount` by withdrawing from `src` and depositing into `dst`.
pub(crate) fn withdraw_then_deposit<W: Wallet + ?Sized>(
    src: &mut W,
    dst: &mut dyn Wallet,
    currency: Currency,
    amount: f64,
) -> SimResult<f64> {
    let moving = src.check_withdraw(currency, amount)?;
    validate_deposit(currency, moving)?;
    let moved = src.withdraw(currency, moving)?;
    dst.deposit(currency, moved)?;
    Ok(moved)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub usd: f64,
    pub token: f64,
    pub total_usd_in: f64,
    pub total_token_in: f64,
}

impl fmt::Display for WalletSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AgentWallet={{USD={}; TOKEN={}; total_USD_in={}; total_TOKEN_in={}}}",
            money_str(self.usd),
            amount_str(self.token),
            money_str(self.total_usd_in),
            amount_str(self.total_token_in),
        )
    }
}

pub fn format_wallet(wallet: &dyn Wallet) -> String {
    wallet.snapshot().to_string()
}

/// `$1,234.50`
pub fn money_str(x: f64) -> String {
    format!("${}", group_thousands(x, 2))
}

/// `1,234.5678`
pub fn amount_str(x: f64) -> String {
    group_thousands(x, 4)
}

fn group_thousands(x: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, x.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
