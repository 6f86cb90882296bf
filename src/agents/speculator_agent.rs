// src/agents/speculator_agent.rs

use std::any::Any;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::{
    agent_trait::Agent,
    agent_type::AgentKind,
    config::{SPECULATOR_DT_PER_BUY, SPECULATOR_S_BETWEEN_SPECULATES},
    holdings::DatatokenHoldings,
    timer::ActionTimer,
};
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::Wallet;

/// Periodically buys datatokens from a random pool that has not been rugged.
#[derive(Debug)]
pub struct SpeculatorAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    timer: ActionTimer,
    dt_per_buy: f64,
    holdings: DatatokenHoldings,
}

impl SpeculatorAgent {
    pub fn new(name: impl Into<String>, wallet: Box<dyn Wallet>) -> Self {
        Self::with_period(name, wallet, SPECULATOR_S_BETWEEN_SPECULATES)
    }

    pub fn with_period(name: impl Into<String>, wallet: Box<dyn Wallet>, s_between_speculates: u64) -> Self {
        Self {
            name: name.into(),
            wallet,
            timer: ActionTimer::new(s_between_speculates),
            dt_per_buy: SPECULATOR_DT_PER_BUY,
            holdings: DatatokenHoldings::new(),
        }
    }

    pub fn holdings(&self) -> &DatatokenHoldings {
        &self.holdings
    }

    pub fn s_between_speculates(&self) -> u64 {
        self.timer.period()
    }

    fn pools_for_speculate(&self, state: &SimState) -> Vec<String> {
        state
            .pool_agents()
            .into_iter()
            .filter(|pa| !state.is_rugged(pa.name()))
            .map(|pa| pa.name().to_string())
            .collect()
    }

    pub fn should_speculate(&self, state: &SimState) -> bool {
        self.timer.is_due() && !self.pools_for_speculate(state).is_empty()
    }

    /// Buys from a random eligible pool. Skips, rather than fails, when the
    /// pool's price is out of reach.
    pub fn speculate(&mut self, state: &mut SimState) -> SimResult<()> {
        let pools = self.pools_for_speculate(state);
        let pool_name = pools.choose(state.rng()).cloned().ok_or_else(|| {
            SimError::precondition(format!("{} has no unrugged pool to speculate in", self.name))
        })?;

        let budget = self.wallet.token();
        let pa = state.pool_agent_mut(&pool_name)?;
        let quote = pa.datatoken_quote(self.dt_per_buy);
        match quote {
            Some(q) if q <= budget => {
                let paid = pa.buy_datatoken(self.wallet.as_mut(), &mut self.holdings, self.dt_per_buy, budget)?;
                debug!(speculator = %self.name, pool = %pool_name, paid, "bought datatoken");
            }
            _ => {
                warn!(speculator = %self.name, pool = %pool_name, ?quote, budget, "cannot afford datatoken, skipping");
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
//  Agent impl
// -----------------------------------------------------------------------------
impl Agent for SpeculatorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Speculator
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        self.timer.advance(state.time_step());
        if self.should_speculate(state) {
            self.timer.reset();
            self.speculate(state)?;
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agents::pool_agent::PoolAgent;
    use crate::config::SimStrategy;
    use crate::pool::{Pool, TokenId, WeightedPool, to_base18};
    use crate::wallet::LocalWallet;

    /// A finalized pool: 100 DT at weight 3, `token` at weight 7.
    pub(crate) fn add_pool(state: &mut SimState, i: usize, token: f64) {
        let dt = TokenId::datatoken(i);
        let mut pool = WeightedPool::default();
        pool.bind(&dt, to_base18(100.0), to_base18(3.0)).unwrap();
        pool.bind(&TokenId::native(), to_base18(token), to_base18(7.0)).unwrap();
        pool.finalize("alice").unwrap();
        state
            .add_agent(Box::new(PoolAgent::new(format!("pool{i}"), Box::new(pool), dt, "alice")))
            .unwrap();
    }

    fn speculator(token: f64) -> SpeculatorAgent {
        SpeculatorAgent::new("spec", LocalWallet::boxed(0.0, token).unwrap())
    }

    #[test]
    fn no_pools_is_a_precondition_violation() {
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        let mut agent = speculator(1000.0);

        assert!(!agent.should_speculate(&state));
        let err = agent.speculate(&mut state).unwrap_err();
        assert!(matches!(err, SimError::PreconditionViolation(_)));
    }

    #[test]
    fn rugged_pools_are_not_eligible() {
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        add_pool(&mut state, 0, 1000.0);
        state.rug_pool("pool0");
        let mut agent = speculator(500.0);

        assert!(agent.speculate(&mut state).is_err());
    }

    #[test]
    fn speculating_trades_token_for_datatoken() {
        // Arrange
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        add_pool(&mut state, 0, 1000.0);
        let mut agent = speculator(500.0);

        // Act
        agent.speculate(&mut state).unwrap();

        // Assert
        assert!(agent.wallet().token() < 500.0);
        assert_eq!(agent.holdings().balance(&TokenId::datatoken(0)), 1.0);
    }

    #[test]
    fn unaffordable_quote_is_skipped() {
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        add_pool(&mut state, 0, 1000.0);
        let mut agent = speculator(0.5);

        agent.speculate(&mut state).unwrap();

        assert_eq!(agent.wallet().token(), 0.5);
        assert!(agent.holdings().is_empty());
    }

    #[test]
    fn take_step_speculates_every_period() {
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        add_pool(&mut state, 0, 1000.0);
        state.add_agent(Box::new(speculator(1000.0))).unwrap();

        // hourly ticks, 8-hour period: buys on ticks 8, 16 and 24
        for _ in 0..24 {
            state.tick().unwrap();
        }

        let agent = state.agent_as::<SpeculatorAgent>("spec").unwrap();
        assert_eq!(agent.holdings().balance(&TokenId::datatoken(0)), 3.0);
    }
}
