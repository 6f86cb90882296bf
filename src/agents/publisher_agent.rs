// src/agents/publisher_agent.rs

use std::any::Any;

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use super::{
    agent_trait::Agent,
    agent_type::AgentKind,
    config::{
        MALICIOUS_RUG_FRACTION, MALICIOUS_RUG_TIME_FRACTION, MALICIOUS_WAIT_TO_RUG_FRACTION,
        PUBLISHER_DT_INIT, PUBLISHER_DT_STAKE, PUBLISHER_DT_WEIGHT, PUBLISHER_MIN_TOKEN_TO_CREATE,
        PUBLISHER_S_BETWEEN_CREATE, PUBLISHER_S_BETWEEN_SELL, PUBLISHER_S_BETWEEN_UNSTAKE,
        PUBLISHER_SELL_FRACTION, PUBLISHER_TOKEN_WEIGHT, PUBLISHER_UNSTAKE_FRACTION,
    },
    holdings::DatatokenHoldings,
    pool_agent::PoolAgent,
    timer::ActionTimer,
};
use crate::error::{SimError, SimResult};
use crate::pool::{MAX_IN_RATIO, Pool, TokenId, WeightedPool, from_base18, to_base18};
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// How a publisher treats the pools it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherPolicy {
    /// Slow profit taking from any of its pools.
    Normal,
    /// Rugs its newest pool `s_wait_to_rug` seconds after creating it, then
    /// dumps on that pool for `s_rug_time` seconds.
    Malicious { s_wait_to_rug: u64, s_rug_time: u64 },
}

impl PublisherPolicy {
    pub fn malicious_for(s_between_create: u64) -> Self {
        let s_wait_to_rug = (s_between_create as f64 * MALICIOUS_WAIT_TO_RUG_FRACTION) as u64;
        let s_rug_time = (s_wait_to_rug as f64 * MALICIOUS_RUG_TIME_FRACTION) as u64;
        PublisherPolicy::Malicious {
            s_wait_to_rug,
            s_rug_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublisherConfig {
    pub dt_init: f64,
    pub dt_stake: f64,
    pub pool_weight_dt: f64,
    pub pool_weight_token: f64,
    pub min_token_to_create: f64,
    pub s_between_create: u64,
    pub s_between_unstake: u64,
    pub s_between_sell: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            dt_init: PUBLISHER_DT_INIT,
            dt_stake: PUBLISHER_DT_STAKE,
            pool_weight_dt: PUBLISHER_DT_WEIGHT,
            pool_weight_token: PUBLISHER_TOKEN_WEIGHT,
            min_token_to_create: PUBLISHER_MIN_TOKEN_TO_CREATE,
            s_between_create: PUBLISHER_S_BETWEEN_CREATE,
            s_between_unstake: PUBLISHER_S_BETWEEN_UNSTAKE,
            s_between_sell: PUBLISHER_S_BETWEEN_SELL,
        }
    }
}

/// Mints datatokens, seeds a pool for each one, then takes profit by
/// unstaking and selling into its pools.
#[derive(Debug)]
pub struct PublisherAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    config: PublisherConfig,
    policy: PublisherPolicy,
    create_timer: ActionTimer,
    unstake_timer: ActionTimer,
    sell_timer: ActionTimer,
    holdings: DatatokenHoldings,
    /// Pools created by this agent, oldest first.
    pools: Vec<String>,
}

impl PublisherAgent {
    pub fn new(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        config: PublisherConfig,
        policy: PublisherPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            wallet,
            create_timer: ActionTimer::new(config.s_between_create),
            unstake_timer: ActionTimer::new(config.s_between_unstake),
            sell_timer: ActionTimer::new(config.s_between_sell),
            config,
            policy,
            holdings: DatatokenHoldings::new(),
            pools: Vec::new(),
        }
    }

    pub fn policy(&self) -> PublisherPolicy {
        self.policy
    }

    pub fn pools(&self) -> &[String] {
        &self.pools
    }

    pub fn holdings(&self) -> &DatatokenHoldings {
        &self.holdings
    }

    pub fn s_since_create(&self) -> u64 {
        self.create_timer.seconds_since()
    }

    fn newest_pool(&self) -> Option<&str> {
        self.pools.last().map(String::as_str)
    }

    fn in_rug_window(&self) -> bool {
        match self.policy {
            PublisherPolicy::Normal => true,
            PublisherPolicy::Malicious {
                s_wait_to_rug,
                s_rug_time,
            } => {
                let s = self.create_timer.seconds_since();
                s >= s_wait_to_rug && s <= s_wait_to_rug + s_rug_time
            }
        }
    }

    fn fraction(&self, normal: f64) -> f64 {
        match self.policy {
            PublisherPolicy::Normal => normal,
            PublisherPolicy::Malicious { .. } => MALICIOUS_RUG_FRACTION,
        }
    }

    // -----------------------------------------------------------------------------
    //  Create
    // -----------------------------------------------------------------------------

    fn should_create(&self) -> bool {
        self.wallet.token() >= self.config.min_token_to_create && self.create_timer.is_due()
    }

    fn create_pool(&mut self, state: &mut SimState) -> SimResult<()> {
        let token_amt = self.wallet.token();
        if token_amt <= 0.0 {
            return Err(SimError::precondition(format!("{} has no token to seed a pool", self.name)));
        }

        let pool_i = state.num_pools();
        let datatoken = TokenId::datatoken(pool_i);
        let pool_name = format!("pool{pool_i}");

        /* mint the datatoken, keep what is not staked */
        self.holdings.add(&datatoken, self.config.dt_init)?;

        let mut pool = WeightedPool::default();
        pool.bind(
            &datatoken,
            to_base18(self.config.dt_stake),
            to_base18(self.config.pool_weight_dt),
        )?;
        pool.bind(
            &TokenId::native(),
            to_base18(token_amt),
            to_base18(self.config.pool_weight_token),
        )?;
        pool.finalize(&self.name)?;

        self.holdings.remove(&datatoken, self.config.dt_stake)?;
        self.wallet.withdraw(Currency::Token, token_amt)?;

        state.add_agent(Box::new(PoolAgent::new(
            pool_name.clone(),
            Box::new(pool),
            datatoken.clone(),
            self.name.clone(),
        )))?;
        info!(publisher = %self.name, pool = %pool_name, %datatoken, token = token_amt, "pool created");
        self.pools.push(pool_name);
        Ok(())
    }

    // -----------------------------------------------------------------------------
    //  Unstake
    // -----------------------------------------------------------------------------

    fn has_stake(&self, state: &SimState, pool_name: &str) -> bool {
        state
            .pool_agent(pool_name)
            .map(|pa| pa.pool().shares_of(&self.name) > 0)
            .unwrap_or(false)
    }

    fn staked_pools(&self, state: &SimState) -> Vec<String> {
        match self.policy {
            PublisherPolicy::Normal => self
                .pools
                .iter()
                .filter(|p| self.has_stake(state, p))
                .cloned()
                .collect(),
            PublisherPolicy::Malicious { .. } => self
                .newest_pool()
                .filter(|p| self.has_stake(state, p))
                .map(|p| vec![p.to_string()])
                .unwrap_or_default(),
        }
    }

    fn should_unstake(&self, state: &SimState) -> bool {
        self.unstake_timer.is_due() && self.in_rug_window() && !self.staked_pools(state).is_empty()
    }

    fn unstake_somewhere(&mut self, state: &mut SimState) -> SimResult<()> {
        let candidates = self.staked_pools(state);
        let pool_name = candidates
            .choose(state.rng())
            .cloned()
            .ok_or_else(|| SimError::precondition(format!("{} has no stake to withdraw", self.name)))?;
        let fraction = self.fraction(PUBLISHER_UNSTAKE_FRACTION);

        let pa = state.pool_agent_mut(&pool_name)?;
        let shares = pa.pool().shares_of(&self.name);
        let exit_shares = to_base18(from_base18(shares) * fraction).min(shares);
        let out = pa
            .pool_mut()
            .exit_swap_pool_amount_in(&self.name, &TokenId::native(), exit_shares, 0)?;
        self.wallet.deposit(Currency::Token, from_base18(out))?;

        debug!(publisher = %self.name, pool = %pool_name, token_out = from_base18(out), "unstaked");
        Ok(())
    }

    // -----------------------------------------------------------------------------
    //  Sell datatokens
    // -----------------------------------------------------------------------------

    /// (datatoken, pool) pairs this agent could sell into right now.
    fn sellable(&self, state: &SimState) -> Vec<(TokenId, String)> {
        match self.policy {
            PublisherPolicy::Normal => state
                .pool_agents()
                .into_iter()
                .filter(|pa| self.holdings.balance(pa.datatoken()) > 0.0)
                .map(|pa| (pa.datatoken().clone(), pa.name().to_string()))
                .collect(),
            PublisherPolicy::Malicious { .. } => self
                .newest_pool()
                .and_then(|p| state.pool_agent(p).ok())
                .filter(|pa| self.holdings.balance(pa.datatoken()) > 0.0)
                .map(|pa| vec![(pa.datatoken().clone(), pa.name().to_string())])
                .unwrap_or_default(),
        }
    }

    fn should_sell(&self, state: &SimState) -> bool {
        self.sell_timer.is_due() && self.in_rug_window() && !self.sellable(state).is_empty()
    }

    fn sell_somewhere(&mut self, state: &mut SimState) -> SimResult<()> {
        let candidates = self.sellable(state);

        /* random datatoken first, then a random pool offering it */
        let datatokens = distinct_datatokens(&candidates);
        let datatoken = datatokens
            .choose(state.rng())
            .cloned()
            .ok_or_else(|| SimError::precondition(format!("{} has no datatoken to sell", self.name)))?;
        let pools: Vec<String> = candidates
            .into_iter()
            .filter(|(dt, _)| *dt == datatoken)
            .map(|(_, p)| p)
            .collect();
        let pool_name = pools
            .choose(state.rng())
            .cloned()
            .ok_or_else(|| SimError::precondition(format!("no pool offers {datatoken}")))?;

        let fraction = self.fraction(PUBLISHER_SELL_FRACTION);
        let pa = state.pool_agent_mut(&pool_name)?;
        let reserve = from_base18(pa.pool().balance(&datatoken)?);
        let amount = (fraction * self.holdings.balance(&datatoken)).min(reserve * MAX_IN_RATIO * 0.99);
        if amount <= 0.0 {
            warn!(publisher = %self.name, pool = %pool_name, "nothing to sell");
            return Ok(());
        }

        let out = pa.pool_mut().swap_exact_amount_in(
            &datatoken,
            to_base18(amount),
            &TokenId::native(),
            0,
        )?;
        self.holdings.remove(&datatoken, amount)?;
        self.wallet.deposit(Currency::Token, from_base18(out))?;

        debug!(publisher = %self.name, pool = %pool_name, %datatoken, amount, token_out = from_base18(out), "sold datatoken");
        Ok(())
    }

    // -----------------------------------------------------------------------------
    //  Rug
    // -----------------------------------------------------------------------------

    fn should_rug(&self) -> bool {
        match self.policy {
            PublisherPolicy::Normal => false,
            PublisherPolicy::Malicious { s_wait_to_rug, .. } => {
                self.create_timer.seconds_since() == s_wait_to_rug && !self.pools.is_empty()
            }
        }
    }
}

/// Each datatoken once, however many pools offer it.
fn distinct_datatokens(candidates: &[(TokenId, String)]) -> Vec<TokenId> {
    let mut datatokens: Vec<TokenId> = candidates.iter().map(|(dt, _)| dt.clone()).collect();
    datatokens.sort_unstable();
    datatokens.dedup();
    datatokens
}

// -----------------------------------------------------------------------------
//  Agent impl
// -----------------------------------------------------------------------------
impl Agent for PublisherAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        match self.policy {
            PublisherPolicy::Normal => AgentKind::Publisher,
            PublisherPolicy::Malicious { .. } => AgentKind::MaliciousPublisher,
        }
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        let dt = state.time_step();
        self.create_timer.advance(dt);
        self.unstake_timer.advance(dt);
        self.sell_timer.advance(dt);

        if self.should_create() {
            self.create_timer.reset();
            self.create_pool(state)?;
        }

        if self.should_unstake(state) {
            self.unstake_timer.reset();
            self.unstake_somewhere(state)?;
        }

        if self.should_sell(state) {
            self.sell_timer.reset();
            self.sell_somewhere(state)?;
        }

        if self.should_rug() {
            if let Some(pool) = self.newest_pool().map(str::to_string) {
                info!(publisher = %self.name, %pool, "rug pull");
                state.rug_pool(&pool);
            }
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

// -----------------------------------------------------------------------------
//  Unit Tests
// -----------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimStrategy;
    use crate::constants::S_PER_DAY;
    use crate::wallet::LocalWallet;

    fn day_state() -> SimState {
        let strategy = SimStrategy {
            time_step: S_PER_DAY,
            ..SimStrategy::default()
        };
        SimState::new(strategy).unwrap()
    }

    /// Creates every 4 days; unstakes and sells every `s_between_trades`.
    fn publisher_with(name: &str, token: f64, policy: PublisherPolicy, s_between_trades: u64) -> PublisherAgent {
        let config = PublisherConfig {
            s_between_create: 4 * S_PER_DAY,
            s_between_unstake: s_between_trades,
            s_between_sell: s_between_trades,
            ..PublisherConfig::default()
        };
        PublisherAgent::new(name, LocalWallet::boxed(0.0, token).unwrap(), config, policy)
    }

    fn publisher(name: &str, token: f64, policy: PublisherPolicy) -> PublisherAgent {
        publisher_with(name, token, policy, S_PER_DAY)
    }

    #[test]
    fn creates_a_pool_with_all_its_token() {
        // Arrange
        let mut state = day_state();
        let quiet = publisher_with("pub0", 1000.0, PublisherPolicy::Normal, 30 * S_PER_DAY);
        state.add_agent(Box::new(quiet)).unwrap();

        // Act: the create timer reaches 4 days on tick 4
        for _ in 0..4 {
            state.tick().unwrap();
        }

        // Assert
        let p = state.agent_as::<PublisherAgent>("pub0").unwrap();
        assert_eq!(p.pools(), &["pool0".to_string()]);
        assert_eq!(p.wallet().token(), 0.0);
        let dt0 = TokenId::datatoken(0);
        assert_eq!(p.holdings().balance(&dt0), PUBLISHER_DT_INIT - PUBLISHER_DT_STAKE);

        let pool = state.pool_agent("pool0").unwrap();
        assert_eq!(pool.creator(), "pub0");
        assert_eq!(pool.datatoken(), &dt0);
        assert_eq!(from_base18(pool.pool().balance(&TokenId::native()).unwrap()), 1000.0);
        assert_eq!(pool.pool().shares_of("pub0"), to_base18(100.0));
    }

    #[test]
    fn too_little_token_never_creates() {
        let mut state = day_state();
        state
            .add_agent(Box::new(publisher("pub0", 199.0, PublisherPolicy::Normal)))
            .unwrap();
        for _ in 0..10 {
            state.tick().unwrap();
        }
        assert_eq!(state.num_pools(), 0);
    }

    #[test]
    fn normal_publisher_takes_profit_after_creating() {
        let mut state = day_state();
        state
            .add_agent(Box::new(publisher("pub0", 1000.0, PublisherPolicy::Normal)))
            .unwrap();
        for _ in 0..6 {
            state.tick().unwrap();
        }

        let p = state.agent_as::<PublisherAgent>("pub0").unwrap();
        assert!(p.wallet().token() > 0.0, "unstaking and selling bring token back");
        assert!(p.holdings().balance(&TokenId::datatoken(0)) < PUBLISHER_DT_INIT - PUBLISHER_DT_STAKE);
        assert!(state.pool_agent("pool0").unwrap().pool().shares_of("pub0") < to_base18(100.0));
        assert!(state.rugged_pools().is_empty());
    }

    // ---------------------------------------------------------------------------------
    // Malicious policy
    // ---------------------------------------------------------------------------------

    #[test]
    fn rug_fires_exactly_once_per_creation_cycle() {
        // Arrange: create every 4 days, rug 2 days after creating, 1-day window.
        let mut state = day_state();
        let policy = PublisherPolicy::Malicious {
            s_wait_to_rug: 2 * S_PER_DAY,
            s_rug_time: S_PER_DAY,
        };
        state.add_agent(Box::new(publisher("evil", 1000.0, policy))).unwrap();

        // Act
        let mut rugged_at = Vec::new();
        for _ in 0..7 {
            let before = state.rugged_pools().len();
            state.tick().unwrap();
            if state.rugged_pools().len() > before {
                rugged_at.push(state.current_tick());
            }
        }

        // Assert: pool0 created on tick 4, rugged on tick 6 only
        assert_eq!(rugged_at, vec![6]);
        assert_eq!(state.rugged_pools(), &["pool0".to_string()]);
        assert!(state.is_rugged("pool0"));
        assert_eq!(
            state.agent("evil").unwrap().kind(),
            AgentKind::MaliciousPublisher
        );
    }

    #[test]
    fn malicious_publisher_only_dumps_inside_the_window() {
        let mut state = day_state();
        let policy = PublisherPolicy::Malicious {
            s_wait_to_rug: 2 * S_PER_DAY,
            s_rug_time: S_PER_DAY,
        };
        state.add_agent(Box::new(publisher("evil", 1000.0, policy))).unwrap();

        // tick 5: one day after creating, before the window
        for _ in 0..5 {
            state.tick().unwrap();
        }
        assert_eq!(state.pool_agent("pool0").unwrap().pool().shares_of("evil"), to_base18(100.0));

        // tick 6: two days after creating, inside the window
        state.tick().unwrap();
        let shares = state.pool_agent("pool0").unwrap().pool().shares_of("evil");
        assert_eq!(shares, to_base18(80.0));

        // 20% of the 80 held DT is 16, capped just under half the 20 DT reserve
        let p = state.agent_as::<PublisherAgent>("evil").unwrap();
        let expected = 80.0 - 20.0 * MAX_IN_RATIO * 0.99;
        assert!((p.holdings().balance(&TokenId::datatoken(0)) - expected).abs() < 1e-9);
    }

    #[test]
    fn rug_and_trade_predicates_leave_the_publisher_untouched() {
        // Arrange: pool0 is created on tick 4, the window is ticks 6..=7
        let mut state = day_state();
        let policy = PublisherPolicy::Malicious {
            s_wait_to_rug: 2 * S_PER_DAY,
            s_rug_time: S_PER_DAY,
        };
        state.add_agent(Box::new(publisher("evil", 1000.0, policy))).unwrap();
        let dt0 = TokenId::datatoken(0);

        let mut rug_ticks = Vec::new();
        for _ in 0..9 {
            state.tick().unwrap();
            let p = state.agent_as::<PublisherAgent>("evil").unwrap();
            let timers = (p.create_timer, p.unstake_timer, p.sell_timer);
            let wallet = p.wallet().snapshot();
            let held = p.holdings().balance(&dt0);
            let pools = p.pools().to_vec();

            // Act
            let first = (p.should_rug(), p.in_rug_window(), p.should_sell(&state), p.should_unstake(&state));
            let again: Vec<_> = (0..3)
                .map(|_| (p.should_rug(), p.in_rug_window(), p.should_sell(&state), p.should_unstake(&state)))
                .collect();

            // Assert
            assert!(again.iter().all(|r| *r == first), "tick {}", state.current_tick());
            assert_eq!((p.create_timer, p.unstake_timer, p.sell_timer), timers);
            assert_eq!(p.wallet().snapshot(), wallet);
            assert_eq!(p.holdings().balance(&dt0), held);
            assert_eq!(p.pools(), pools.as_slice());
            if first.0 {
                rug_ticks.push(state.current_tick());
            }
        }
        assert_eq!(rug_ticks, vec![6]);
    }

    #[test]
    fn sell_candidates_are_deduplicated_across_pools() {
        // Arrange: two pools for DT0, interleaved with one for DT1
        let candidates = vec![
            (TokenId::datatoken(0), "pool0".to_string()),
            (TokenId::datatoken(1), "pool1".to_string()),
            (TokenId::datatoken(0), "pool2".to_string()),
        ];

        // Act
        let datatokens = distinct_datatokens(&candidates);

        // Assert
        assert_eq!(datatokens, vec![TokenId::datatoken(0), TokenId::datatoken(1)]);
    }

    #[test]
    fn default_malicious_window_follows_create_period() {
        assert_eq!(
            PublisherPolicy::malicious_for(10 * S_PER_DAY),
            PublisherPolicy::Malicious {
                s_wait_to_rug: 5 * S_PER_DAY,
                s_rug_time: S_PER_DAY
            }
        );
    }
}
