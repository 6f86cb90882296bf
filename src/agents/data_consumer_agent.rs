// src/agents/data_consumer_agent.rs

use std::any::Any;

use rand::seq::SliceRandom;
use tracing::debug;

use super::{
    agent_trait::Agent,
    agent_type::AgentKind,
    config::{DATA_CONSUMER_DT_PER_BUY, DATA_CONSUMER_S_BETWEEN_BUYS},
    holdings::DatatokenHoldings,
    timer::ActionTimer,
};
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::Wallet;

/// Buys a datatoken (to consume the dataset behind it) every few days from
/// any unrugged pool it can afford.
#[derive(Debug)]
pub struct DataConsumerAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    timer: ActionTimer,
    holdings: DatatokenHoldings,
}

impl DataConsumerAgent {
    pub fn new(name: impl Into<String>, wallet: Box<dyn Wallet>) -> Self {
        Self {
            name: name.into(),
            wallet,
            timer: ActionTimer::new(DATA_CONSUMER_S_BETWEEN_BUYS),
            holdings: DatatokenHoldings::new(),
        }
    }

    pub fn holdings(&self) -> &DatatokenHoldings {
        &self.holdings
    }

    /// Pools where one datatoken costs less than the whole token balance.
    fn candidate_pools(&self, state: &SimState) -> Vec<String> {
        let budget = self.wallet.token();
        state
            .pool_agents()
            .into_iter()
            .filter(|pa| !state.is_rugged(pa.name()))
            .filter(|pa| {
                pa.datatoken_quote(DATA_CONSUMER_DT_PER_BUY)
                    .is_some_and(|q| q < budget)
            })
            .map(|pa| pa.name().to_string())
            .collect()
    }

    fn should_buy(&self, state: &SimState) -> bool {
        self.timer.is_due() && !self.candidate_pools(state).is_empty()
    }

    fn buy(&mut self, state: &mut SimState) -> SimResult<()> {
        let candidates = self.candidate_pools(state);
        let pool_name = candidates
            .choose(state.rng())
            .cloned()
            .ok_or_else(|| SimError::precondition(format!("{} cannot afford any pool", self.name)))?;

        let budget = self.wallet.token();
        let pa = state.pool_agent_mut(&pool_name)?;
        let paid = pa.buy_datatoken(
            self.wallet.as_mut(),
            &mut self.holdings,
            DATA_CONSUMER_DT_PER_BUY,
            budget,
        )?;
        debug!(consumer = %self.name, pool = %pool_name, paid, "consumed dataset");
        Ok(())
    }
}

impl Agent for DataConsumerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::DataConsumer
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        self.timer.advance(state.time_step());
        if self.should_buy(state) {
            self.timer.reset();
            self.buy(state)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
