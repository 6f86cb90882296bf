// src/ledger.rs

//! Token ledger with mint authority. Amounts are base-18 fixed point.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BURN_ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Address(s.into())
    }

    pub fn burn() -> Self {
        Address(BURN_ADDRESS.to_string())
    }

    /// Deterministic address for a named agent.
    pub fn for_agent(name: &str) -> Self {
        // FNV-1a, so addresses are stable across runs and platforms
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in name.bytes() {
            h ^= u64::from(b);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        Address(format!("0x{h:040x}"))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{address} holds {available} base units, cannot send {requested}")]
    InsufficientBalance {
        address: Address,
        requested: u128,
        available: u128,
    },
    #[error("minting {amount} would overflow the total supply")]
    SupplyOverflow { amount: u128 },
}

pub trait Ledger: fmt::Debug {
    fn symbol(&self) -> &str;
    fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError>;
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;
    fn balance_of(&self, who: &Address) -> u128;
    fn total_supply(&self) -> u128;
}

/// Shared handle; every ledger-backed wallet in a run points at the same ledger.
pub type SharedLedger = Rc<RefCell<dyn Ledger>>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    symbol: String,
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl InMemoryLedger {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn shared(symbol: impl Into<String>) -> SharedLedger {
        Rc::new(RefCell::new(Self::new(symbol)))
    }
}

impl Ledger for InMemoryLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                address: from.clone(),
                requested: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        self.balances.insert(from.clone(), available - amount);
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn balance_of(&self, who: &Address) -> u128 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_and_transfer_conserve_supply() {
        let mut ledger = InMemoryLedger::new("TKN");
        let alice = Address::for_agent("alice");
        let bob = Address::for_agent("bob");

        ledger.mint(&alice, 100).unwrap();
        ledger.transfer(&alice, &bob, 40).unwrap();

        assert_eq!(ledger.balance_of(&alice), 60);
        assert_eq!(ledger.balance_of(&bob), 40);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn overdraw_is_rejected_without_side_effects() {
        let mut ledger = InMemoryLedger::new("TKN");
        let alice = Address::new("alice");
        ledger.mint(&alice, 5).unwrap();

        let err = ledger.transfer(&alice, &Address::burn(), 6).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                address: alice.clone(),
                requested: 6,
                available: 5
            }
        );
        assert_eq!(ledger.balance_of(&alice), 5);
    }

    #[test]
    fn agent_addresses_are_stable_and_distinct() {
        assert_eq!(Address::for_agent("dao"), Address::for_agent("dao"));
        assert_ne!(Address::for_agent("dao"), Address::for_agent("burner"));
        assert_eq!(Address::for_agent("dao").0.len(), 42);
    }
}
