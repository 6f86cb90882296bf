// src/error.rs

//! The error taxonomy shared by every layer of the simulation.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::pool::PoolError;
use crate::wallet::Currency;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// Negative amount, unknown agent name, malformed configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A withdraw or transfer asked for more than the wallet holds.
    #[error("{currency} withdraw amount ({requested}) exceeds holdings ({available})")]
    InsufficientFunds {
        currency: Currency,
        requested: f64,
        available: f64,
    },

    /// An action was invoked while its trigger predicate was false.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Fatal to the run: non-positive price, KPI length mismatch.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("pool rejected the call: {0}")]
    Pool(#[from] PoolError),

    #[error("ledger rejected the call: {0}")]
    Ledger(#[from] LedgerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        SimError::PreconditionViolation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        SimError::InvariantViolation(msg.into())
    }
}
