// src/agents/mod.rs

pub mod agent_trait;
pub mod agent_type;
pub mod config;
pub mod holdings;
pub mod timer;

pub mod burner_agent;
pub mod data_consumer_agent;
pub mod grant_giving_agent;
pub mod grant_taking_agent;
pub mod marketplaces_agent;
pub mod mint_schedule;
pub mod minter_agent;
pub mod pool_agent;
pub mod publisher_agent;
pub mod router_agent;
pub mod speculator_agent;
