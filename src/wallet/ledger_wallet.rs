// src/wallet/ledger_wallet.rs

use std::rc::Rc;

use super::balance::{settle_withdraw, validate_deposit};
use super::{Balance, Currency, Wallet, withdraw_then_deposit};
use crate::error::SimResult;
use crate::ledger::{Address, Ledger, SharedLedger};
use crate::pool::{from_base18, to_base18};

/// USD lives in-process; the token balance lives on a shared ledger.
///
/// Depositing token mints it to this wallet's address. Withdrawing sends it to
/// the burn address, from where the caller re-deposits it elsewhere. Transfers
/// to another wallet on the same ledger are a single ledger transfer, so they
/// leave the ledger's supply alone.
#[derive(Debug)]
pub struct LedgerWallet {
    address: Address,
    ledger: SharedLedger,
    usd: Balance,
    total_token_in: f64,
}

impl LedgerWallet {
    pub fn new(address: Address, ledger: SharedLedger, usd: f64, token: f64) -> SimResult<Self> {
        let mut w = Self {
            address,
            ledger,
            usd: Balance::new(Currency::Usd, usd)?,
            total_token_in: 0.0,
        };
        if token > 0.0 {
            w.deposit(Currency::Token, token)?;
        } else {
            validate_deposit(Currency::Token, token)?;
        }
        Ok(w)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    fn token_base_units(&self) -> u128 {
        self.ledger.borrow().balance_of(&self.address)
    }

    /// The float amount and base units a token withdraw of `amount` moves.
    fn settle_token(&self, amount: f64) -> SimResult<(f64, u128)> {
        let held_base = self.token_base_units();
        let held = from_base18(held_base);
        let settled = settle_withdraw(Currency::Token, held, amount)?;
        // whole-balance moves take every base unit, leaving no dust
        let base = if settled == held {
            held_base
        } else {
            to_base18(settled).min(held_base)
        };
        Ok((settled, base))
    }
}

impl Wallet for LedgerWallet {
    fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd.amount(),
            Currency::Token => from_base18(self.token_base_units()),
        }
    }

    fn total_in(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd.total_in(),
            Currency::Token => self.total_token_in,
        }
    }

    fn deposit(&mut self, currency: Currency, amount: f64) -> SimResult<()> {
        match currency {
            Currency::Usd => self.usd.deposit(amount),
            Currency::Token => {
                validate_deposit(currency, amount)?;
                self.ledger.borrow_mut().mint(&self.address, to_base18(amount))?;
                self.total_token_in += amount;
                Ok(())
            }
        }
    }

    fn withdraw(&mut self, currency: Currency, amount: f64) -> SimResult<f64> {
        match currency {
            Currency::Usd => self.usd.withdraw(amount),
            Currency::Token => {
                let (settled, base) = self.settle_token(amount)?;
                self.ledger
                    .borrow_mut()
                    .transfer(&self.address, &Address::burn(), base)?;
                Ok(settled)
            }
        }
    }

    fn transfer(&mut self, dst: &mut dyn Wallet, currency: Currency, amount: f64) -> SimResult<f64> {
        let dst_address = match dst.ledger_account() {
            Some((ledger, address)) if currency == Currency::Token && Rc::ptr_eq(ledger, &self.ledger) => {
                address.clone()
            }
            _ => return withdraw_then_deposit(self, dst, currency, amount),
        };
        let (moving, base) = self.settle_token(amount)?;
        validate_deposit(currency, moving)?;
        self.ledger
            .borrow_mut()
            .transfer(&self.address, &dst_address, base)?;
        dst.credit_ledger_arrival(moving);
        Ok(moving)
    }

    fn ledger_account(&self) -> Option<(&SharedLedger, &Address)> {
        Some((&self.ledger, &self.address))
    }

    fn credit_ledger_arrival(&mut self, amount: f64) {
        self.total_token_in += amount;
    }
}
