// src/pool/mod.rs

//! Automated-market-maker collaborator.
//!
//! The simulation core only talks to pools through the [`Pool`] trait, in
//! base-18 fixed-point units. [`WeightedPool`] is the in-process reference.

pub mod weighted_pool;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use weighted_pool::WeightedPool;

pub const BASE: f64 = 1e18;

/// Largest share of a reserve a single swap may put in.
pub const MAX_IN_RATIO: f64 = 0.5;
/// Largest share of a reserve a single swap may take out.
pub const MAX_OUT_RATIO: f64 = 1.0 / 3.0;

pub fn to_base18(x: f64) -> u128 {
    if x.is_nan() || x <= 0.0 {
        return 0;
    }
    (x * BASE).round() as u128
}

pub fn from_base18(x: u128) -> f64 {
    x as f64 / BASE
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn native() -> Self {
        TokenId("TOKEN".to_string())
    }

    /// The `i`-th datatoken a publisher mints.
    pub fn datatoken(i: usize) -> Self {
        TokenId(format!("DT{i}"))
    }

    pub fn is_native(&self) -> bool {
        *self == Self::native()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoolError {
    #[error("token {0} is not bound to the pool")]
    NotBound(TokenId),
    #[error("token {0} is already bound")]
    AlreadyBound(TokenId),
    #[error("pool is already finalized")]
    Finalized,
    #[error("pool is not finalized")]
    NotFinalized,
    #[error("a pool needs at least two tokens to finalize")]
    TooFewTokens,
    #[error("weight {0} is outside the allowed range")]
    InvalidWeight(f64),
    #[error("amount in exceeds the max in-ratio of the reserve")]
    MaxInRatio,
    #[error("amount out exceeds the max out-ratio of the reserve")]
    MaxOutRatio,
    #[error("swap needs {required} in but the limit is {limit}")]
    LimitIn { required: u128, limit: u128 },
    #[error("swap yields {got} out but the minimum is {min}")]
    LimitOut { got: u128, min: u128 },
    #[error("{holder} holds {held} shares, cannot exit {requested}")]
    InsufficientShares {
        holder: String,
        held: u128,
        requested: u128,
    },
    #[error("pool math produced a non-finite result")]
    Math,
}

/// Constant-weight pool interface. All amounts and weights are base-18.
pub trait Pool: fmt::Debug {
    fn tokens(&self) -> Vec<TokenId>;
    fn balance(&self, token: &TokenId) -> Result<u128, PoolError>;
    /// Denormalized weight.
    fn weight(&self, token: &TokenId) -> Result<u128, PoolError>;
    fn swap_fee(&self) -> u128;
    fn spot_price(&self, token_in: &TokenId, token_out: &TokenId) -> Result<u128, PoolError>;

    fn calc_in_given_out(
        &self,
        balance_in: u128,
        weight_in: u128,
        balance_out: u128,
        weight_out: u128,
        amount_out: u128,
        swap_fee: u128,
    ) -> Result<u128, PoolError>;

    fn calc_out_given_in(
        &self,
        balance_in: u128,
        weight_in: u128,
        balance_out: u128,
        weight_out: u128,
        amount_in: u128,
        swap_fee: u128,
    ) -> Result<u128, PoolError>;

    fn bind(&mut self, token: &TokenId, amount: u128, weight: u128) -> Result<(), PoolError>;
    /// Opens the pool for trading and issues the initial shares to `controller`.
    fn finalize(&mut self, controller: &str) -> Result<(), PoolError>;

    /// Returns the amount of `token_out` received.
    fn swap_exact_amount_in(
        &mut self,
        token_in: &TokenId,
        amount_in: u128,
        token_out: &TokenId,
        min_amount_out: u128,
    ) -> Result<u128, PoolError>;

    /// Returns the amount of `token_in` paid.
    fn swap_exact_amount_out(
        &mut self,
        token_in: &TokenId,
        max_amount_in: u128,
        token_out: &TokenId,
        amount_out: u128,
    ) -> Result<u128, PoolError>;

    /// Single-sided join; returns shares minted to `holder`.
    fn join_swap_extern_amount_in(
        &mut self,
        holder: &str,
        token_in: &TokenId,
        amount_in: u128,
        min_pool_amount_out: u128,
    ) -> Result<u128, PoolError>;

    /// Single-sided exit; returns the amount of `token_out` paid to `holder`.
    fn exit_swap_pool_amount_in(
        &mut self,
        holder: &str,
        token_out: &TokenId,
        pool_amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128, PoolError>;

    fn shares_of(&self, holder: &str) -> u128;
    fn total_shares(&self) -> u128;
}

/// Token cost, in whole units, of buying `amount_out` of `token_out`.
pub fn quote_in_given_out(
    pool: &dyn Pool,
    token_in: &TokenId,
    token_out: &TokenId,
    amount_out: f64,
) -> Result<f64, PoolError> {
    let raw = pool.calc_in_given_out(
        pool.balance(token_in)?,
        pool.weight(token_in)?,
        pool.balance(token_out)?,
        pool.weight(token_out)?,
        to_base18(amount_out),
        pool.swap_fee(),
    )?;
    Ok(from_base18(raw))
}
