// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod agents;
pub mod config;
pub mod constants;
pub mod error;
pub mod kpis;
pub mod ledger;
pub mod netlist;
pub mod pool;
pub mod registry;
pub mod sim_state;
pub mod snapshot;
pub mod valuation;
pub mod wallet;

// === 2. Re-export the public-facing components ===

// --- From `agents` ---
pub use agents::agent_trait::Agent;
pub use agents::agent_type::AgentKind;
pub use agents::burner_agent::BurnerAgent;
pub use agents::data_consumer_agent::DataConsumerAgent;
pub use agents::grant_giving_agent::GrantGivingAgent;
pub use agents::grant_taking_agent::GrantTakingAgent;
pub use agents::marketplaces_agent::MarketplacesAgent;
pub use agents::mint_schedule::MintSchedule;
pub use agents::minter_agent::MinterAgent;
pub use agents::pool_agent::PoolAgent;
pub use agents::publisher_agent::{PublisherAgent, PublisherConfig, PublisherPolicy};
pub use agents::router_agent::{RouterAgent, WeightFn, fixed_weight, weight};
pub use agents::speculator_agent::SpeculatorAgent;

// --- The engine ---
pub use config::{SimStrategy, WalletBackend};
pub use error::{SimError, SimResult};
pub use kpis::{KpiSample, Kpis, PriceSummary};
pub use netlist::build_sustainability_loop;
pub use sim_state::SimState;
pub use snapshot::{SnapshotWriter, TickSnapshot};

// --- Collaborators ---
pub use ledger::{Address, InMemoryLedger, Ledger, LedgerError, SharedLedger};
pub use pool::{Pool, PoolError, TokenId, WeightedPool};
pub use wallet::{BurnWallet, Currency, LedgerWallet, LocalWallet, Wallet, WalletSnapshot};
