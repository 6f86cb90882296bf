// src/agents/grant_taking_agent.rs

use std::any::Any;

use tracing::debug;

use super::{agent_trait::Agent, agent_type::AgentKind};
use crate::error::SimResult;
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// Spends whatever it receives as soon as it has it. The spend leaves the
/// economy through the state's sink and is reported to the KPIs as R&D.
#[derive(Debug)]
pub struct GrantTakingAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    spent_at_tick: f64,
}

impl GrantTakingAgent {
    pub fn new(name: impl Into<String>, wallet: Box<dyn Wallet>) -> Self {
        Self {
            name: name.into(),
            wallet,
            spent_at_tick: 0.0,
        }
    }

    /// USD value spent on the most recent step.
    pub fn spent_at_tick(&self) -> f64 {
        self.spent_at_tick
    }
}

impl Agent for GrantTakingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::GrantTaker
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        let usd = self.wallet.usd();
        let token = self.wallet.token();
        let token_value = if token > 0.0 {
            token * state.token_price()?
        } else {
            0.0
        };
        self.spent_at_tick = usd + token_value;

        if usd > 0.0 {
            self.wallet.transfer(state.sink_mut(), Currency::Usd, usd)?;
        }
        if token > 0.0 {
            self.wallet.transfer(state.sink_mut(), Currency::Token, token)?;
        }
        if self.spent_at_tick > 0.0 {
            debug!(taker = %self.name, spent = self.spent_at_tick, "spent grant");
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
