// src/wallet/burn_wallet.rs

use super::{Balance, Currency, Wallet};
use crate::error::{SimError, SimResult};

/// A one-way sink. Funds that arrive here have left the economy.
#[derive(Debug, Clone)]
pub struct BurnWallet {
    usd: Balance,
    token: Balance,
}

impl BurnWallet {
    pub fn new() -> Self {
        Self {
            usd: Balance::empty(Currency::Usd),
            token: Balance::empty(Currency::Token),
        }
    }
}

impl Default for BurnWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl Wallet for BurnWallet {
    fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd.amount(),
            Currency::Token => self.token.amount(),
        }
    }

    fn total_in(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd.total_in(),
            Currency::Token => self.token.total_in(),
        }
    }

    fn deposit(&mut self, currency: Currency, amount: f64) -> SimResult<()> {
        match currency {
            Currency::Usd => self.usd.deposit(amount),
            Currency::Token => self.token.deposit(amount),
        }
    }

    fn withdraw(&mut self, currency: Currency, _amount: f64) -> SimResult<f64> {
        Err(SimError::invalid(format!("cannot withdraw {currency} from a burn wallet")))
    }

    fn check_withdraw(&self, currency: Currency, _amount: f64) -> SimResult<f64> {
        Err(SimError::invalid(format!("cannot withdraw {currency} from a burn wallet")))
    }
}
