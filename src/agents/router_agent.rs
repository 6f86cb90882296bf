// src/agents/router_agent.rs

use std::any::Any;
use std::fmt;

use tracing::debug;

use super::{agent_trait::Agent, agent_type::AgentKind};
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// Share of the router's balance a receiver gets, evaluated every tick.
pub type WeightFn = Box<dyn Fn(&SimState) -> f64>;

pub fn weight<F>(f: F) -> WeightFn
where
    F: Fn(&SimState) -> f64 + 'static,
{
    Box::new(f)
}

pub fn fixed_weight(w: f64) -> WeightFn {
    Box::new(move |_| w)
}

/// Passes everything it receives straight on, split across its receivers.
pub struct RouterAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    receivers: Vec<(String, WeightFn)>,
}

impl fmt::Debug for RouterAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterAgent")
            .field("name", &self.name)
            .field("wallet", &self.wallet)
            .field("receivers", &self.receiver_names())
            .finish()
    }
}

impl RouterAgent {
    pub fn new(name: impl Into<String>, wallet: Box<dyn Wallet>, receivers: Vec<(String, WeightFn)>) -> Self {
        Self {
            name: name.into(),
            wallet,
            receivers,
        }
    }

    pub fn receiver_names(&self) -> Vec<&str> {
        self.receivers.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Current weights, validated.
    fn weights(&self, state: &SimState) -> SimResult<Vec<f64>> {
        let mut running = 0.0;
        let mut weights = Vec::with_capacity(self.receivers.len());
        for (receiver, f) in &self.receivers {
            let w = f(state);
            if !w.is_finite() || w < 0.0 {
                return Err(SimError::invalid(format!(
                    "{}: weight for {receiver} must be finite and non-negative, got {w}",
                    self.name
                )));
            }
            running += w;
            if running > 1.0 + 1e-9 {
                return Err(SimError::invalid(format!(
                    "{}: receiver weights sum past 1 ({running})",
                    self.name
                )));
            }
            weights.push(w);
        }
        Ok(weights)
    }

    fn route(&mut self, state: &mut SimState, currency: Currency, weights: &[f64]) -> SimResult<()> {
        let total = self.wallet.balance(currency);
        if total == 0.0 {
            return Ok(());
        }

        let last = self.receivers.len() - 1;
        for (i, ((receiver, _), w)) in self.receivers.iter().zip(weights).enumerate() {
            /* the last receiver sweeps the remainder so nothing is left behind */
            let amount = if i == last {
                self.wallet.balance(currency)
            } else {
                (w * total).min(self.wallet.balance(currency))
            };
            if amount <= 0.0 {
                continue;
            }
            let dst = state.wallet_mut(receiver)?;
            self.wallet.transfer(dst, currency, amount)?;
            debug!(router = %self.name, %receiver, %currency, amount, "routed");
        }
        Ok(())
    }
}

impl Agent for RouterAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Router
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        if self.receivers.is_empty() {
            return Ok(());
        }
        let weights = self.weights(state)?;
        self.route(state, Currency::Usd, &weights)?;
        self.route(state, Currency::Token, &weights)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
