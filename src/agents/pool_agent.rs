// src/agents/pool_agent.rs

use std::any::Any;

use super::{agent_trait::Agent, agent_type::AgentKind, holdings::DatatokenHoldings};
use crate::error::{SimError, SimResult};
use crate::pool::{MAX_OUT_RATIO, Pool, TokenId, from_base18, quote_in_given_out, to_base18};
use crate::sim_state::SimState;
use crate::wallet::{Currency, LocalWallet, Wallet};

/// Registry entry for a live pool. Passive: other agents trade against it.
#[derive(Debug)]
pub struct PoolAgent {
    name: String,
    pool: Box<dyn Pool>,
    datatoken: TokenId,
    creator: String,
    wallet: LocalWallet,
}

impl PoolAgent {
    pub fn new(
        name: impl Into<String>,
        pool: Box<dyn Pool>,
        datatoken: TokenId,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pool,
            datatoken,
            creator: creator.into(),
            wallet: LocalWallet::empty(),
        }
    }

    pub fn pool(&self) -> &dyn Pool {
        self.pool.as_ref()
    }

    pub fn pool_mut(&mut self) -> &mut dyn Pool {
        self.pool.as_mut()
    }

    pub fn datatoken(&self) -> &TokenId {
        &self.datatoken
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Token cost of buying `amount` datatokens, or `None` if the pool cannot
    /// serve that much in one swap.
    pub fn datatoken_quote(&self, amount: f64) -> Option<f64> {
        let reserve = from_base18(self.pool.balance(&self.datatoken).ok()?);
        if amount > reserve * MAX_OUT_RATIO {
            return None;
        }
        quote_in_given_out(self.pool.as_ref(), &TokenId::native(), &self.datatoken, amount)
            .ok()
            .filter(|q| q.is_finite())
    }

    /// Buys exactly `amount` datatokens for `buyer`, paying at most
    /// `max_token_in`. Returns the token paid.
    pub fn buy_datatoken(
        &mut self,
        buyer: &mut dyn Wallet,
        holdings: &mut DatatokenHoldings,
        amount: f64,
        max_token_in: f64,
    ) -> SimResult<f64> {
        let quote = self
            .datatoken_quote(amount)
            .ok_or_else(|| SimError::precondition(format!("{} cannot sell {amount} datatokens", self.name)))?;

        // debit first; a failed swap refunds the buyer
        let escrow = buyer.withdraw(Currency::Token, quote)?;
        let swapped = self.pool.swap_exact_amount_out(
            &TokenId::native(),
            to_base18(max_token_in),
            &self.datatoken,
            to_base18(amount),
        );
        let paid = match swapped {
            Ok(paid) => from_base18(paid),
            Err(e) => {
                buyer.deposit(Currency::Token, escrow)?;
                return Err(e.into());
            }
        };
        let change = (escrow - paid).max(0.0);
        if change > 0.0 {
            buyer.deposit(Currency::Token, change)?;
        }
        holdings.add(&self.datatoken, amount)?;
        Ok(escrow - change)
    }
}

impl Agent for PoolAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Pool
    }

    fn wallet(&self) -> &dyn Wallet {
        &self.wallet
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        &mut self.wallet
    }

    fn take_step(&mut self, _state: &mut SimState) -> SimResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
