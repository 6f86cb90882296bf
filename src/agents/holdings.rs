// src/agents/holdings.rs

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};
use crate::pool::TokenId;

/// Datatoken balances an agent holds outside of its wallet.
#[derive(Debug, Clone, Default)]
pub struct DatatokenHoldings {
    balances: BTreeMap<TokenId, f64>,
}

impl DatatokenHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, token: &TokenId) -> f64 {
        self.balances.get(token).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, token: &TokenId, amount: f64) -> SimResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::invalid(format!("cannot add {amount} of {token}")));
        }
        *self.balances.entry(token.clone()).or_insert(0.0) += amount;
        Ok(())
    }

    pub fn remove(&mut self, token: &TokenId, amount: f64) -> SimResult<()> {
        let held = self.balance(token);
        if !amount.is_finite() || amount < 0.0 || amount > held {
            return Err(SimError::invalid(format!(
                "cannot remove {amount} of {token}, holding {held}"
            )));
        }
        self.balances.insert(token.clone(), held - amount);
        Ok(())
    }

    /// Tokens with a nonzero balance, in id order.
    pub fn held(&self) -> Vec<TokenId> {
        self.balances
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.held().is_empty()
    }
}
