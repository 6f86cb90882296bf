// src/agents/agent_type.rs

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentKind {
    Publisher,
    MaliciousPublisher,
    Speculator,
    DataConsumer,
    Router,
    Minter,
    GrantGiver,
    GrantTaker,
    Burner,
    Marketplaces,
    Pool,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentKind::Publisher => "publisher",
            AgentKind::MaliciousPublisher => "malicious_publisher",
            AgentKind::Speculator => "speculator",
            AgentKind::DataConsumer => "data_consumer",
            AgentKind::Router => "router",
            AgentKind::Minter => "minter",
            AgentKind::GrantGiver => "grant_giver",
            AgentKind::GrantTaker => "grant_taker",
            AgentKind::Burner => "burner",
            AgentKind::Marketplaces => "marketplaces",
            AgentKind::Pool => "pool",
        };
        f.write_str(s)
    }
}
