// src/agents/burner_agent.rs

use std::any::Any;

use tracing::debug;

use super::{agent_trait::Agent, agent_type::AgentKind};
use crate::error::SimResult;
use crate::sim_state::SimState;
use crate::wallet::{BurnWallet, Currency, Wallet};

/// Receives the burn share of the toll. Nothing ever leaves it.
#[derive(Debug)]
pub struct BurnerAgent {
    name: String,
    wallet: BurnWallet,
    recorded_usd: f64,
    recorded_token: f64,
}

impl BurnerAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallet: BurnWallet::new(),
            recorded_usd: 0.0,
            recorded_token: 0.0,
        }
    }
}

impl Agent for BurnerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Burner
    }

    fn wallet(&self) -> &dyn Wallet {
        &self.wallet
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        &mut self.wallet
    }

    /// Books whatever arrived since the last step as burned. USD counts as
    /// token bought back at the current price.
    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        let new_usd = self.wallet.total_in(Currency::Usd) - self.recorded_usd;
        let new_token = self.wallet.total_in(Currency::Token) - self.recorded_token;
        if new_usd <= 0.0 && new_token <= 0.0 {
            return Ok(());
        }

        let price = state.token_price()?;
        let tokens = new_token + new_usd / price;
        state.record_burn(tokens, new_usd + new_token * price);
        self.recorded_usd += new_usd;
        self.recorded_token += new_token;
        debug!(burner = %self.name, tokens, usd = new_usd, "burned");
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
    use crate::config::SimStrategy;

    #[test]
    fn records_each_arrival_once() {
        // Arrange
        let mut state = SimState::new(SimStrategy::default()).unwrap();
        let price = state.token_price().unwrap();
        let mut burner = BurnerAgent::new("burner");
        burner.wallet_mut().deposit(Currency::Token, 10.0).unwrap();
        burner.wallet_mut().deposit(Currency::Usd, 2.0 * price).unwrap();

        // Act
        burner.take_step(&mut state).unwrap();
        burner.take_step(&mut state).unwrap();

        // Assert
        assert!((state.total_burned() - 12.0).abs() < 1e-9);
        assert!((state.total_burned_usd() - 12.0 * price).abs() < 1e-6);
    }

    #[test]
    fn burner_never_pays_out() {
        let mut burner = BurnerAgent::new("burner");
        burner.wallet_mut().deposit(Currency::Usd, 1.0).unwrap();
        assert!(burner.wallet_mut().withdraw(Currency::Usd, 1.0).is_err());
        assert_eq!(burner.wallet().usd(), 1.0);
    }
}
