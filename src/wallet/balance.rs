// src/wallet/balance.rs

use serde::{Deserialize, Serialize};

use super::Currency;
use crate::constants::WITHDRAW_ALL_TOLERANCE;
use crate::error::{SimError, SimResult};

/// One currency's holdings plus the running total ever deposited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    currency: Currency,
    amount: f64,
    total_in: f64,
}

impl Balance {
    /// The opening amount counts towards `total_in`.
    pub fn new(currency: Currency, initial: f64) -> SimResult<Self> {
        validate_deposit(currency, initial)?;
        Ok(Self {
            currency,
            amount: initial,
            total_in: initial,
        })
    }

    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            amount: 0.0,
            total_in: 0.0,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn total_in(&self) -> f64 {
        self.total_in
    }

    pub fn deposit(&mut self, amount: f64) -> SimResult<()> {
        validate_deposit(self.currency, amount)?;
        self.amount += amount;
        self.total_in += amount;
        Ok(())
    }

    /// Removes `amount` and returns what actually left the balance. A request
    /// within tolerance of the full balance empties it exactly.
    pub fn withdraw(&mut self, amount: f64) -> SimResult<f64> {
        let settled = settle_withdraw(self.currency, self.amount, amount)?;
        if settled == self.amount {
            self.amount = 0.0;
        } else {
            self.amount -= settled;
        }
        Ok(settled)
    }
}

pub(crate) fn validate_deposit(currency: Currency, amount: f64) -> SimResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SimError::invalid(format!(
            "{currency} deposit amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}

/// Works out how much a withdraw of `amount` from `held` really removes.
pub(crate) fn settle_withdraw(currency: Currency, held: f64, amount: f64) -> SimResult<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SimError::invalid(format!(
            "{currency} withdraw amount must be a non-negative number, got {amount}"
        )));
    }

    if amount > 0.0 && held > 0.0 {
        let ratio = amount / held;
        if (1.0 - WITHDRAW_ALL_TOLERANCE..=1.0 + WITHDRAW_ALL_TOLERANCE).contains(&ratio) {
            return Ok(held);
        }
    }

    let mut amount = amount;
    if amount > held {
        amount = round_to_12_decimals(amount);
    }
    if amount > held {
        return Err(SimError::InsufficientFunds {
            currency,
            requested: amount,
            available: held,
        });
    }
    Ok(amount)
}

fn round_to_12_decimals(x: f64) -> f64 {
    (x * 1e12).round() / 1e12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_and_withdraw_track_totals() {
        let mut b = Balance::empty(Currency::Usd);
        b.deposit(13.25).unwrap();
        b.deposit(1.0).unwrap();
        b.withdraw(2.10).unwrap();
        b.deposit(0.0).unwrap();
        b.withdraw(0.0).unwrap();

        assert!((b.amount() - 12.15).abs() < 1e-12);
        assert_eq!(b.total_in(), 14.25, "withdrawals never reduce total_in");
    }

    #[test]
    fn negative_amounts_are_invalid() {
        let mut b = Balance::new(Currency::Token, 5.0).unwrap();
        assert!(matches!(b.deposit(-5.0), Err(SimError::InvalidArgument(_))));
        assert!(matches!(b.withdraw(-5.0), Err(SimError::InvalidArgument(_))));
        assert!(matches!(b.deposit(f64::NAN), Err(SimError::InvalidArgument(_))));
        assert_eq!(b.amount(), 5.0);
    }

    #[test]
    fn overdraw_is_insufficient_funds() {
        let mut b = Balance::new(Currency::Usd, 10.0).unwrap();
        let err = b.withdraw(1000.0).unwrap_err();
        assert!(matches!(
            err,
            SimError::InsufficientFunds { currency: Currency::Usd, .. }
        ));
        assert_eq!(b.amount(), 10.0, "failed withdraw must not touch the balance");
    }

    #[test]
    fn withdraw_within_tolerance_empties_exactly() {
        let mut b = Balance::new(Currency::Token, 0.1 + 0.2).unwrap();
        // 0.3 is a hair below 0.1 + 0.2 in binary floating point
        let taken = b.withdraw(0.3).unwrap();
        assert_eq!(b.amount(), 0.0);
        assert_eq!(taken, 0.1 + 0.2);

        let mut b = Balance::new(Currency::Usd, 1.0).unwrap();
        b.withdraw(1.0 + 5e-13).unwrap();
        assert_eq!(b.amount(), 0.0, "slightly-over request still withdraws all");
    }

    #[test]
    fn rounding_to_12_decimals_rescues_tiny_overdraws() {
        // Far enough from `held` that the relative tolerance does not apply,
        // but the excess is below the 12th decimal.
        assert_eq!(settle_withdraw(Currency::Usd, 1e-3, 1e-3 + 1e-16).unwrap(), 1e-3);
        assert!(settle_withdraw(Currency::Usd, 1e-3, 1e-3 + 1e-9).is_err());
    }
}
