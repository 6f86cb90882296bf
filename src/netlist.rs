// src/netlist.rs

//! Wiring of the standard economy: who pays whom.
//!
//! Marketplace sales pay a toll that is split between the DAO and the burner.
//! The minter and three treasuries fund the DAO and the two management teams,
//! whose routers pass everything on to the workers that spend it.

use tracing::info;

use crate::agents::{
    burner_agent::BurnerAgent,
    config::{
        GRANT_N_ACTIONS_DAO, GRANT_N_ACTIONS_MGMT, GRANT_N_ACTIONS_STUDIO, MINTER_HALF_LIFE_YEARS, MINTER_RAMP_M1,
        MINTER_RAMP_M2, MINTER_RAMP_M3, MINTER_RAMP_T0, MINTER_RAMP_T1, MINTER_RAMP_T2, MINTER_RAMP_T3,
        MKTS_INIT_REVENUE_PER_S,
    },
    data_consumer_agent::DataConsumerAgent,
    grant_giving_agent::GrantGivingAgent,
    grant_taking_agent::GrantTakingAgent,
    marketplaces_agent::MarketplacesAgent,
    mint_schedule::MintSchedule,
    minter_agent::MinterAgent,
    publisher_agent::{PublisherAgent, PublisherConfig, PublisherPolicy},
    router_agent::{RouterAgent, fixed_weight, weight},
    speculator_agent::SpeculatorAgent,
};
use crate::config::SimStrategy;
use crate::constants::{
    FOUNDATION_TREASURY_TOKEN_FOR_DAO, FOUNDATION_TREASURY_TOKEN_FOR_MGMT, FOUNDATION_TREASURY_USD,
    STUDIO_TREASURY_TOKEN, STUDIO_TREASURY_USD, UNMINTED_TOKEN_SUPPLY,
};
use crate::error::SimResult;
use crate::sim_state::SimState;

pub const MARKETPLACES: &str = "marketplaces1";
pub const TOLL: &str = "toll";
pub const BURNER: &str = "burner";
pub const DAO: &str = "dao";
pub const MINTER: &str = "minter";
pub const DAO_GRANTS: &str = "foundation_dao_grants";
pub const FOUNDATION_MGMT_GRANTS: &str = "foundation_mgmt_grants";
pub const STUDIO_GRANTS: &str = "studio_grants";
pub const FOUNDATION_MGMT: &str = "foundation_mgmt";
pub const STUDIO_MGMT: &str = "studio_mgmt";
pub const DAO_WORKERS: &str = "dao_workers";
pub const FOUNDATION_WORKERS: &str = "foundation_workers";
pub const STUDIO_WORKERS: &str = "studio_workers";

/// A ready-to-run world with the standard economy, plus the data ecosystem
/// when `strategy.with_data_ecosystem` is set.
pub fn build_sustainability_loop(strategy: SimStrategy) -> SimResult<SimState> {
    let with_data_ecosystem = strategy.with_data_ecosystem;
    let init_n_marketplaces = strategy.init_n_marketplaces;
    let mut state = SimState::new(strategy)?;

    add_revenue_side(&mut state, init_n_marketplaces)?;
    add_funding_side(&mut state)?;
    add_workers(&mut state)?;
    if with_data_ecosystem {
        add_data_ecosystem(&mut state)?;
    }

    info!(agents = state.num_agents(), with_data_ecosystem, "netlist built");
    Ok(state)
}

// -----------------------------------------------------------------------------
//  Revenue: marketplaces -> toll -> {dao, burner}
// -----------------------------------------------------------------------------
fn add_revenue_side(state: &mut SimState, n_marketplaces: f64) -> SimResult<()> {
    let wallet = state.new_wallet(MARKETPLACES, 0.0, 0.0)?;
    let mkts = MarketplacesAgent::new(
        MARKETPLACES,
        wallet,
        TOLL,
        n_marketplaces,
        MKTS_INIT_REVENUE_PER_S,
    )?;
    state.add_agent(Box::new(mkts))?;

    let wallet = state.new_wallet(TOLL, 0.0, 0.0)?;
    state.add_agent(Box::new(RouterAgent::new(
        TOLL,
        wallet,
        vec![
            (DAO.to_string(), weight(|s| s.percent_to_dao())),
            (BURNER.to_string(), weight(|s| s.percent_burn())),
        ],
    )))?;
    state.add_agent(Box::new(BurnerAgent::new(BURNER)))
}

// -----------------------------------------------------------------------------
//  Funding: minter and treasuries
// -----------------------------------------------------------------------------

/// Nothing is minted for half a year, then release ramps up to full speed by year 3.
pub fn standard_mint_schedule() -> SimResult<MintSchedule> {
    MintSchedule::ramped_exp(
        MINTER_HALF_LIFE_YEARS,
        MINTER_RAMP_T0,
        MINTER_RAMP_T1,
        MINTER_RAMP_T2,
        MINTER_RAMP_T3,
        MINTER_RAMP_M1,
        MINTER_RAMP_M2,
        MINTER_RAMP_M3,
    )
}

fn add_funding_side(state: &mut SimState) -> SimResult<()> {
    let wallet = state.new_wallet(MINTER, 0.0, 0.0)?;
    let minter = MinterAgent::new(
        MINTER,
        wallet,
        DAO,
        UNMINTED_TOKEN_SUPPLY,
        standard_mint_schedule()?,
    )?;
    state.add_agent(Box::new(minter))?;

    let grants = [
        (DAO_GRANTS, DAO, 0.0, FOUNDATION_TREASURY_TOKEN_FOR_DAO, GRANT_N_ACTIONS_DAO),
        (
            FOUNDATION_MGMT_GRANTS,
            FOUNDATION_MGMT,
            FOUNDATION_TREASURY_USD,
            FOUNDATION_TREASURY_TOKEN_FOR_MGMT,
            GRANT_N_ACTIONS_MGMT,
        ),
        (STUDIO_GRANTS, STUDIO_MGMT, STUDIO_TREASURY_USD, STUDIO_TREASURY_TOKEN, GRANT_N_ACTIONS_STUDIO),
    ];
    for (name, receiver, usd, token, n_actions) in grants {
        let wallet = state.new_wallet(name, usd, token)?;
        state.add_agent(Box::new(GrantGivingAgent::monthly(name, wallet, receiver, n_actions)?))?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
//  Spending: routers -> workers
// -----------------------------------------------------------------------------
fn add_workers(state: &mut SimState) -> SimResult<()> {
    for (router, workers) in [(DAO, DAO_WORKERS), (FOUNDATION_MGMT, FOUNDATION_WORKERS), (STUDIO_MGMT, STUDIO_WORKERS)] {
        let wallet = state.new_wallet(router, 0.0, 0.0)?;
        state.add_agent(Box::new(RouterAgent::new(
            router,
            wallet,
            vec![(workers.to_string(), fixed_weight(1.0))],
        )))?;
    }
    for workers in [DAO_WORKERS, FOUNDATION_WORKERS, STUDIO_WORKERS] {
        let wallet = state.new_wallet(workers, 0.0, 0.0)?;
        state.add_agent(Box::new(GrantTakingAgent::new(workers, wallet)))?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
//  Data ecosystem
// -----------------------------------------------------------------------------
fn add_data_ecosystem(state: &mut SimState) -> SimResult<()> {
    let s = state.strategy().clone();
    let publisher_config = PublisherConfig::default();

    for i in 0..s.n_publishers {
        let name = format!("publisher{i}");
        let wallet = state.new_wallet(&name, 0.0, s.publisher_token)?;
        state.add_agent(Box::new(PublisherAgent::new(
            name,
            wallet,
            publisher_config.clone(),
            PublisherPolicy::Normal,
        )))?;
    }
    for i in 0..s.n_malicious_publishers {
        let name = format!("malicious_publisher{i}");
        let wallet = state.new_wallet(&name, 0.0, s.publisher_token)?;
        let policy = PublisherPolicy::malicious_for(publisher_config.s_between_create);
        state.add_agent(Box::new(PublisherAgent::new(name, wallet, publisher_config.clone(), policy)))?;
    }
    for i in 0..s.n_speculators {
        let name = format!("speculator{i}");
        let wallet = state.new_wallet(&name, 0.0, s.speculator_token)?;
        state.add_agent(Box::new(SpeculatorAgent::new(name, wallet)))?;
    }
    for i in 0..s.n_data_consumers {
        let name = format!("data_consumer{i}");
        let wallet = state.new_wallet(&name, 0.0, s.data_consumer_token)?;
        state.add_agent(Box::new(DataConsumerAgent::new(name, wallet)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::agent_type::AgentKind;
    use crate::config::WalletBackend;
    use crate::constants::{S_PER_DAY, S_PER_HOUR};
    use crate::ledger::{Address, Ledger};
    use crate::wallet::{Currency, Wallet};

    fn daily(max_ticks: u64) -> SimStrategy {
        SimStrategy {
            time_step: S_PER_DAY,
            max_ticks,
            ..SimStrategy::default()
        }
    }

    #[test]
    fn standard_loop_has_the_expected_agents_in_order() {
        let state = build_sustainability_loop(daily(1)).unwrap();

        let names = state.agent_names();
        assert_eq!(names[0], MARKETPLACES);
        assert_eq!(names[1], TOLL);
        assert_eq!(names[2], BURNER);
        assert_eq!(state.num_agents(), 13);
        assert_eq!(state.num_pools(), 0);
    }

    #[test]
    fn two_months_of_the_loop_burn_and_spend_before_minting_starts() {
        // Arrange
        let mut state = build_sustainability_loop(daily(60)).unwrap();

        // Act
        state.run().unwrap();

        // Assert
        assert_eq!(state.total_minted(), 0.0, "the ramp holds minting for half a year");
        assert!(state.total_burned() > 0.0);
        assert!(state.kpis().granttakers_spent_series().iter().any(|x| *x > 0.0));
        assert!(state.sink().total_in(Currency::Usd) > 0.0);
        for router in [TOLL, DAO, FOUNDATION_MGMT, STUDIO_MGMT] {
            let w = state.agent(router).unwrap().wallet();
            assert_eq!(w.usd(), 0.0, "{router} must pass on all USD");
            assert_eq!(w.token(), 0.0, "{router} must pass on all token");
        }
        assert_eq!(state.kpis().tick(), 60);
    }

    #[test]
    fn minting_starts_after_half_a_year() {
        // Arrange
        let mut state = build_sustainability_loop(daily(250)).unwrap();

        // Act
        state.run().unwrap();

        // Assert: tick 182 is the last one before 0.5 years
        let series = state.kpis().total_minted_series();
        assert!(series[..182].iter().all(|m| *m == 0.0));
        assert!(state.total_minted() > 0.0);
        let minter = state.agent_as::<MinterAgent>(MINTER).unwrap();
        let expected = UNMINTED_TOKEN_SUPPLY * standard_mint_schedule().unwrap().fraction(state.elapsed_years());
        assert!((minter.minted() - expected).abs() < 1e-6 * expected);
        assert!((state.total_minted() - minter.minted()).abs() < 1e-6);
    }

    #[test]
    fn ledger_backend_moves_token_without_changing_supply() {
        // Arrange
        let strategy = SimStrategy {
            wallet_backend: WalletBackend::Ledger,
            ..daily(40)
        };
        let mut state = build_sustainability_loop(strategy).unwrap();
        let ledger = state.ledger().cloned().unwrap();
        let supply = ledger.borrow().total_supply();

        // Act
        state.run().unwrap();

        // Assert: nothing minted yet, so only treasury token moved around
        assert_eq!(state.total_minted(), 0.0);
        assert_eq!(ledger.borrow().total_supply(), supply);
        let on_ledger: u128 = state
            .agents()
            .filter_map(|a| a.wallet().ledger_account())
            .map(|(_, address)| ledger.borrow().balance_of(address))
            .sum();
        let spent = ledger.borrow().balance_of(&Address::burn());
        assert!(spent > 0, "workers spend treasury token into the sink");
        assert_eq!(on_ledger + spent, supply);
    }

    #[test]
    fn data_ecosystem_publishers_each_create_one_pool() {
        // Arrange
        let strategy = SimStrategy {
            time_step: S_PER_HOUR,
            max_ticks: 10 * 24,
            with_data_ecosystem: true,
            ..SimStrategy::default()
        };
        let n_publishers = strategy.n_publishers + strategy.n_malicious_publishers;

        // Act
        let mut state = build_sustainability_loop(strategy).unwrap();
        state.run().unwrap();

        // Assert: each publisher creates on day 7; the rug would only land on day 10.5
        assert_eq!(state.num_pools(), n_publishers);
        assert!(state.rugged_pools().is_empty());
        let malicious = state
            .agents()
            .filter(|a| a.kind() == AgentKind::MaliciousPublisher)
            .count();
        assert_eq!(malicious, 1);
        assert!(state.agents_of::<PublisherAgent>().all(|p| p.pools().len() == 1));
    }
}
