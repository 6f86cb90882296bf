// src/sim_state.rs

//! The simulation context: clock, agents, economy counters and KPIs.

use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::agents::agent_trait::Agent;
use crate::agents::grant_taking_agent::GrantTakingAgent;
use crate::agents::marketplaces_agent::MarketplacesAgent;
use crate::agents::pool_agent::PoolAgent;
use crate::config::{SimStrategy, WalletBackend};
use crate::constants::{INIT_TOKEN_SUPPLY, S_PER_YEAR};
use crate::error::{SimError, SimResult};
use crate::kpis::{KpiSample, Kpis};
use crate::ledger::{Address, InMemoryLedger, SharedLedger};
use crate::registry::AgentRegistry;
use crate::valuation;
use crate::wallet::{BurnWallet, LedgerWallet, LocalWallet, Wallet};

/// Owns the world and runs the tick loop.
///
/// Each tick steps every agent registered before the tick began, in
/// registration order. Agents created mid-tick can be looked up at once but
/// first act on the following tick.
pub struct SimState {
    tick: u64,
    strategy: SimStrategy,
    agents: AgentRegistry,
    rugged_pools: Vec<String>,
    kpis: Kpis,

    total_minted: f64,
    total_burned: f64,
    total_burned_usd: f64,
    speculation_valuation: f64,
    percent_burn: f64,
    marketplace_percent_toll: f64,

    rng: StdRng,
    sink: BurnWallet,
    ledger: Option<SharedLedger>,
}

impl SimState {
    pub fn new(strategy: SimStrategy) -> SimResult<Self> {
        strategy.validate()?;
        let ledger = match strategy.wallet_backend {
            WalletBackend::Local => None,
            WalletBackend::Ledger => Some(InMemoryLedger::shared("TOKEN")),
        };
        Ok(Self {
            tick: 0,
            agents: AgentRegistry::new(),
            rugged_pools: Vec::new(),
            kpis: Kpis::new(strategy.time_step),
            total_minted: 0.0,
            total_burned: 0.0,
            total_burned_usd: 0.0,
            speculation_valuation: strategy.init_speculation_valuation,
            percent_burn: strategy.percent_burn,
            marketplace_percent_toll: strategy.marketplace_percent_toll,
            rng: StdRng::seed_from_u64(strategy.seed),
            sink: BurnWallet::new(),
            ledger,
            strategy,
        })
    }

    // -----------------------------------------------------------------------------
    //  Clock
    // -----------------------------------------------------------------------------

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn time_step(&self) -> u64 {
        self.strategy.time_step
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.tick * self.strategy.time_step
    }

    pub fn elapsed_years(&self) -> f64 {
        self.elapsed_seconds() as f64 / S_PER_YEAR as f64
    }

    pub fn strategy(&self) -> &SimStrategy {
        &self.strategy
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // -----------------------------------------------------------------------------
    //  Tick loop
    // -----------------------------------------------------------------------------

    pub fn tick(&mut self) -> SimResult<()> {
        self.tick += 1;

        let stepping: Vec<String> = self.agents.names().to_vec();
        for name in &stepping {
            self.step_agent(name)?;
        }

        self.sample_kpis()?;

        self.speculation_valuation *=
            1.0 + self.strategy.speculation_growth_per_s() * self.strategy.time_step as f64;

        debug!(tick = self.tick, agents = stepping.len(), "tick complete");
        Ok(())
    }

    /// Ticks until `strategy.max_ticks`.
    pub fn run(&mut self) -> SimResult<()> {
        self.run_with(|_| Ok(()))
    }

    /// Like [`SimState::run`], calling `on_tick` after every tick.
    pub fn run_with<F>(&mut self, mut on_tick: F) -> SimResult<()>
    where
        F: FnMut(&SimState) -> SimResult<()>,
    {
        info!(
            max_ticks = self.strategy.max_ticks,
            time_step = self.strategy.time_step,
            agents = self.agents.len(),
            "simulation starting"
        );
        while self.tick < self.strategy.max_ticks {
            self.tick()?;
            on_tick(self)?;
        }
        info!(
            ticks = self.tick,
            minted = self.total_minted,
            burned = self.total_burned,
            "simulation finished"
        );
        Ok(())
    }

    /// Steps a single agent with the rest of the world borrowed mutably.
    pub fn step_agent(&mut self, name: &str) -> SimResult<()> {
        let mut agent = self.agents.checkout(name)?;
        let result = agent.take_step(self);
        self.agents.checkin(agent);
        result
    }

    fn sample_kpis(&mut self) -> SimResult<()> {
        let (revenue_per_marketplace_per_s, n_marketplaces) = self
            .agents_of::<MarketplacesAgent>()
            .next()
            .map(|m| (m.revenue_per_marketplace_per_s(), m.n_marketplaces()))
            .unwrap_or((0.0, 0.0));
        let sample = KpiSample {
            granttakers_spent: self.grant_takers_spent_at_tick(),
            revenue_per_marketplace_per_s,
            n_marketplaces,
            marketplace_percent_toll: self.marketplace_percent_toll,
            total_minted: self.total_minted,
            total_burned: self.total_burned,
            total_burned_usd: self.total_burned_usd,
            ..KpiSample::default()
        };
        let price_to_sales = self.strategy.price_to_sales_ratio;
        let speculation = self.speculation_valuation;
        let supply = self.token_supply();
        // priced after recording so this tick's toll is in the fundamentals
        self.kpis.record_priced(sample, |k| {
            valuation::token_price(k.valuation_ps(price_to_sales) + speculation, supply)
        })?;
        Ok(())
    }

    pub fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    // -----------------------------------------------------------------------------
    //  Agents
    // -----------------------------------------------------------------------------

    pub fn add_agent(&mut self, agent: Box<dyn Agent>) -> SimResult<()> {
        debug!(name = agent.name(), kind = %agent.kind(), "agent added");
        self.agents.insert(agent)
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains(name)
    }

    pub fn agent_names(&self) -> &[String] {
        self.agents.names()
    }

    pub fn agents(&self) -> impl Iterator<Item = &dyn Agent> + '_ {
        self.agents.iter()
    }

    pub fn agent(&self, name: &str) -> SimResult<&dyn Agent> {
        self.agents
            .get(name)
            .ok_or_else(|| SimError::invalid(format!("no available agent named '{name}'")))
    }

    pub fn agent_mut(&mut self, name: &str) -> SimResult<&mut dyn Agent> {
        self.agents
            .get_mut(name)
            .ok_or_else(|| SimError::invalid(format!("no available agent named '{name}'")))
    }

    /// Looks up `name` as a concrete agent type.
    pub fn agent_as<T: Agent + 'static>(&self, name: &str) -> SimResult<&T> {
        self.agent(name)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| SimError::invalid(format!("agent '{name}' has a different type")))
    }

    pub fn agent_as_mut<T: Agent + 'static>(&mut self, name: &str) -> SimResult<&mut T> {
        self.agent_mut(name)?
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| SimError::invalid(format!("agent '{name}' has a different type")))
    }

    /// Every available agent of type `T`, in registration order.
    pub fn agents_of<T: Agent + 'static>(&self) -> impl Iterator<Item = &T> + '_ {
        self.agents.iter().filter_map(|a| a.as_any().downcast_ref::<T>())
    }

    pub fn wallet_mut(&mut self, name: &str) -> SimResult<&mut dyn Wallet> {
        Ok(self.agent_mut(name)?.wallet_mut())
    }

    /// A wallet on the configured backend for a new agent called `name`.
    pub fn new_wallet(&self, name: &str, usd: f64, token: f64) -> SimResult<Box<dyn Wallet>> {
        match &self.ledger {
            Some(ledger) => Ok(Box::new(LedgerWallet::new(
                Address::for_agent(name),
                Rc::clone(ledger),
                usd,
                token,
            )?)),
            None => LocalWallet::boxed(usd, token),
        }
    }

    pub fn ledger(&self) -> Option<&SharedLedger> {
        self.ledger.as_ref()
    }

    pub fn sink(&self) -> &BurnWallet {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut BurnWallet {
        &mut self.sink
    }

    // -----------------------------------------------------------------------------
    //  Pools
    // -----------------------------------------------------------------------------

    pub fn pool_agents(&self) -> Vec<&PoolAgent> {
        self.agents_of::<PoolAgent>().collect()
    }

    pub fn num_pools(&self) -> usize {
        self.agents_of::<PoolAgent>().count()
    }

    pub fn pool_agent(&self, name: &str) -> SimResult<&PoolAgent> {
        self.agent_as::<PoolAgent>(name)
    }

    pub fn pool_agent_mut(&mut self, name: &str) -> SimResult<&mut PoolAgent> {
        self.agent_as_mut::<PoolAgent>(name)
    }

    pub fn rug_pool(&mut self, name: &str) {
        if !self.is_rugged(name) {
            self.rugged_pools.push(name.to_string());
        }
    }

    pub fn is_rugged(&self, name: &str) -> bool {
        self.rugged_pools.iter().any(|p| p == name)
    }

    pub fn rugged_pools(&self) -> &[String] {
        &self.rugged_pools
    }

    // -----------------------------------------------------------------------------
    //  Economy
    // -----------------------------------------------------------------------------

    pub fn record_mint(&mut self, amount: f64) {
        self.total_minted += amount;
    }

    pub fn record_burn(&mut self, tokens: f64, usd: f64) {
        self.total_burned += tokens;
        self.total_burned_usd += usd;
    }

    pub fn total_minted(&self) -> f64 {
        self.total_minted
    }

    pub fn total_burned(&self) -> f64 {
        self.total_burned
    }

    pub fn total_burned_usd(&self) -> f64 {
        self.total_burned_usd
    }

    pub fn percent_burn(&self) -> f64 {
        self.percent_burn
    }

    pub fn set_percent_burn(&mut self, pct: f64) -> SimResult<()> {
        if !(0.0..=1.0).contains(&pct) {
            return Err(SimError::invalid(format!("burn percentage must lie in [0, 1], got {pct}")));
        }
        self.percent_burn = pct;
        Ok(())
    }

    pub fn percent_to_dao(&self) -> f64 {
        1.0 - self.percent_burn
    }

    pub fn marketplace_percent_toll(&self) -> f64 {
        self.marketplace_percent_toll
    }

    pub fn grant_takers_spent_at_tick(&self) -> f64 {
        self.agents_of::<GrantTakingAgent>().map(|g| g.spent_at_tick()).sum()
    }

    pub fn token_supply(&self) -> f64 {
        INIT_TOKEN_SUPPLY + self.total_minted - self.total_burned
    }

    pub fn fundamentals_valuation(&self) -> f64 {
        self.kpis.valuation_ps(self.strategy.price_to_sales_ratio)
    }

    pub fn speculation_valuation(&self) -> f64 {
        self.speculation_valuation
    }

    pub fn overall_valuation(&self) -> f64 {
        self.fundamentals_valuation() + self.speculation_valuation
    }

    /// Token price in USD. A non-positive price or supply is fatal.
    pub fn token_price(&self) -> SimResult<f64> {
        valuation::token_price(self.overall_valuation(), self.token_supply())
    }
}
