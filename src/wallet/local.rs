// src/wallet/local.rs

use super::{Balance, Currency, Wallet};
use crate::error::SimResult;

/// In-process wallet: two independent balances.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    usd: Balance,
    token: Balance,
}

impl LocalWallet {
    pub fn new(usd: f64, token: f64) -> SimResult<Self> {
        Ok(Self {
            usd: Balance::new(Currency::Usd, usd)?,
            token: Balance::new(Currency::Token, token)?,
        })
    }

    pub fn empty() -> Self {
        Self {
            usd: Balance::empty(Currency::Usd),
            token: Balance::empty(Currency::Token),
        }
    }

    pub fn boxed(usd: f64, token: f64) -> SimResult<Box<dyn Wallet>> {
        Ok(Box::new(Self::new(usd, token)?))
    }

    fn side(&self, currency: Currency) -> &Balance {
        match currency {
            Currency::Usd => &self.usd,
            Currency::Token => &self.token,
        }
    }

    fn side_mut(&mut self, currency: Currency) -> &mut Balance {
        match currency {
            Currency::Usd => &mut self.usd,
            Currency::Token => &mut self.token,
        }
    }
}

impl Wallet for LocalWallet {
    fn balance(&self, currency: Currency) -> f64 {
        self.side(currency).amount()
    }

    fn total_in(&self, currency: Currency) -> f64 {
        self.side(currency).total_in()
    }

    fn deposit(&mut self, currency: Currency, amount: f64) -> SimResult<()> {
        self.side_mut(currency).deposit(amount)
    }

    fn withdraw(&mut self, currency: Currency, amount: f64) -> SimResult<f64> {
        self.side_mut(currency).withdraw(amount)
    }
}
