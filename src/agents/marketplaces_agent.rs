// src/agents/marketplaces_agent.rs

use std::any::Any;

use tracing::debug;

use super::{
    agent_trait::Agent,
    agent_type::AgentKind,
    config::{MKTS_INIT_N, MKTS_INIT_REVENUE_PER_S},
};
use crate::constants::S_PER_YEAR;
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// Every marketplace in the ecosystem, modelled as one aggregate.
///
/// The count and the revenue of each marketplace grow together, faster when
/// the grant takers spend more on R&D relative to sales. A fixed share of all
/// sales is paid as toll into the economy.
#[derive(Debug)]
pub struct MarketplacesAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    toll_agent: String,
    n_marketplaces: f64,
    revenue_per_marketplace_per_s: f64,
}

impl MarketplacesAgent {
    pub fn new(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        toll_agent: impl Into<String>,
        n_marketplaces: f64,
        revenue_per_marketplace_per_s: f64,
    ) -> SimResult<Self> {
        if !n_marketplaces.is_finite() || n_marketplaces < 0.0 {
            return Err(SimError::invalid(format!("marketplace count must be non-negative, got {n_marketplaces}")));
        }
        if !revenue_per_marketplace_per_s.is_finite() || revenue_per_marketplace_per_s < 0.0 {
            return Err(SimError::invalid(format!(
                "marketplace revenue must be non-negative, got {revenue_per_marketplace_per_s}"
            )));
        }
        Ok(Self {
            name: name.into(),
            wallet,
            toll_agent: toll_agent.into(),
            n_marketplaces,
            revenue_per_marketplace_per_s,
        })
    }

    /// One marketplace earning the default monthly revenue.
    pub fn with_defaults(name: impl Into<String>, wallet: Box<dyn Wallet>, toll_agent: impl Into<String>) -> SimResult<Self> {
        Self::new(name, wallet, toll_agent, MKTS_INIT_N, MKTS_INIT_REVENUE_PER_S)
    }

    pub fn n_marketplaces(&self) -> f64 {
        self.n_marketplaces
    }

    pub fn revenue_per_marketplace_per_s(&self) -> f64 {
        self.revenue_per_marketplace_per_s
    }

    pub fn toll_agent(&self) -> &str {
        &self.toll_agent
    }

    /// Growth over one tick, compounded from the annual rate.
    fn growth_per_tick(&self, state: &SimState) -> f64 {
        let ratio = state.kpis().mkts_rnd_to_sales_ratio();
        let annual = state.strategy().annual_mkts_growth_rate(ratio);
        let years_per_tick = state.time_step() as f64 / S_PER_YEAR as f64;
        (1.0 + annual).powf(years_per_tick) - 1.0
    }
}

impl Agent for MarketplacesAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Marketplaces
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        let g = self.growth_per_tick(state);
        self.n_marketplaces *= 1.0 + g;
        self.revenue_per_marketplace_per_s *= 1.0 + g;

        let sales = self.n_marketplaces * self.revenue_per_marketplace_per_s * state.time_step() as f64;
        let toll = sales * state.marketplace_percent_toll();
        if toll > 0.0 {
            state.wallet_mut(&self.toll_agent)?.deposit(Currency::Usd, toll)?;
        }
        debug!(
            marketplaces = self.n_marketplaces,
            revenue_per_s = self.revenue_per_marketplace_per_s,
            toll,
            "marketplace sales"
        );
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
mod tests {
    use super::*;
    use crate::agents::router_agent::RouterAgent;
    use crate::config::SimStrategy;
    use crate::constants::S_PER_DAY;
    use crate::wallet::LocalWallet;

    fn state_with_toll(strategy: SimStrategy) -> SimState {
        let mut state = SimState::new(strategy).unwrap();
        state
            .add_agent(Box::new(RouterAgent::new("toll", LocalWallet::boxed(0.0, 0.0).unwrap(), vec![])))
            .unwrap();
        state
    }

    #[test]
    fn pays_toll_on_sales_each_tick() {
        // Arrange
        let mut state = state_with_toll(SimStrategy::default());
        let mut mkts = MarketplacesAgent::new("mkts", LocalWallet::boxed(0.0, 0.0).unwrap(), "toll", 2.0, 1.0).unwrap();

        // Act
        mkts.take_step(&mut state).unwrap();

        // Assert: no R&D yet, so the count shrinks at the zero-sales rate
        let expected_sales = mkts.n_marketplaces() * mkts.revenue_per_marketplace_per_s() * state.time_step() as f64;
        let toll = state.agent("toll").unwrap().wallet().usd();
        assert!((toll - expected_sales * state.marketplace_percent_toll()).abs() < 1e-9);
        assert!(mkts.n_marketplaces() < 2.0);
    }

    #[test]
    fn shrinks_by_the_zero_rnd_rate_over_a_year() {
        let strategy = SimStrategy {
            time_step: S_PER_DAY,
            ..SimStrategy::default()
        };
        let g0 = strategy.growth_rate_if_0_sales;
        let mut state = state_with_toll(strategy);
        state
            .add_agent(Box::new(
                MarketplacesAgent::new("mkts", LocalWallet::boxed(0.0, 0.0).unwrap(), "toll", 1.0, 1.0).unwrap(),
            ))
            .unwrap();

        for _ in 0..(S_PER_YEAR / S_PER_DAY) {
            state.tick().unwrap();
        }

        let mkts = state.agent_as::<MarketplacesAgent>("mkts").unwrap();
        assert!((mkts.n_marketplaces() - (1.0 + g0)).abs() < 1e-6);
        assert_eq!(state.kpis().n_marketplaces_series().last().copied(), Some(mkts.n_marketplaces()));
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert!(MarketplacesAgent::new("m", LocalWallet::boxed(0.0, 0.0).unwrap(), "toll", -1.0, 1.0).is_err());
        assert!(MarketplacesAgent::new("m", LocalWallet::boxed(0.0, 0.0).unwrap(), "toll", 1.0, f64::NAN).is_err());
    }
}
