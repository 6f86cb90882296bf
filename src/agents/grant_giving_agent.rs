// src/agents/grant_giving_agent.rs

use std::any::Any;

use tracing::{debug, info};

use super::{agent_trait::Agent, agent_type::AgentKind, config::GRANT_S_BETWEEN_GRANTS, timer::ActionTimer};
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// Pays its endowment out to one receiver in `n_actions` equal installments.
#[derive(Debug)]
pub struct GrantGivingAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    receiver: String,
    timer: ActionTimer,
    n_actions: u32,
    n_done: u32,
    usd_per_grant: f64,
    token_per_grant: f64,
}

impl GrantGivingAgent {
    pub fn new(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        receiver: impl Into<String>,
        s_between_grants: u64,
        n_actions: u32,
    ) -> SimResult<Self> {
        if n_actions == 0 {
            return Err(SimError::invalid("a grant giver needs at least one action"));
        }
        let usd_per_grant = wallet.usd() / n_actions as f64;
        let token_per_grant = wallet.token() / n_actions as f64;
        Ok(Self {
            name: name.into(),
            wallet,
            receiver: receiver.into(),
            timer: ActionTimer::primed(s_between_grants),
            n_actions,
            n_done: 0,
            usd_per_grant,
            token_per_grant,
        })
    }

    /// Monthly installments.
    pub fn monthly(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        receiver: impl Into<String>,
        n_actions: u32,
    ) -> SimResult<Self> {
        Self::new(name, wallet, receiver, GRANT_S_BETWEEN_GRANTS, n_actions)
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn grants_made(&self) -> u32 {
        self.n_done
    }

    pub fn is_done(&self) -> bool {
        self.n_done >= self.n_actions
    }

    fn give(&mut self, state: &mut SimState) -> SimResult<()> {
        let last = self.n_done + 1 == self.n_actions;
        let (usd, token) = if last {
            (self.wallet.usd(), self.wallet.token())
        } else {
            (
                self.usd_per_grant.min(self.wallet.usd()),
                self.token_per_grant.min(self.wallet.token()),
            )
        };

        let dst = state.wallet_mut(&self.receiver)?;
        if usd > 0.0 {
            self.wallet.transfer(dst, Currency::Usd, usd)?;
        }
        if token > 0.0 {
            self.wallet.transfer(dst, Currency::Token, token)?;
        }
        self.n_done += 1;

        debug!(giver = %self.name, receiver = %self.receiver, usd, token, n = self.n_done, "grant paid");
        if self.is_done() {
            info!(giver = %self.name, "endowment fully disbursed");
        }
        Ok(())
    }
}

impl Agent for GrantGivingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::GrantGiver
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        if self.is_done() {
            return Ok(());
        }
        self.timer.advance(state.time_step());
        if self.timer.is_due() {
            self.timer.reset();
            self.give(state)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::router_agent::RouterAgent;
    use crate::config::SimStrategy;
    use crate::constants::S_PER_DAY;
    use crate::wallet::LocalWallet;

    fn daily_state_with_sink() -> SimState {
        let mut state = SimState::new(SimStrategy {
            time_step: S_PER_DAY,
            ..SimStrategy::default()
        })
        .unwrap();
        // a router with no receivers just accumulates
        state
            .add_agent(Box::new(RouterAgent::new("dst", LocalWallet::boxed(0.0, 0.0).unwrap(), vec![])))
            .unwrap();
        state
    }

    #[test]
    fn pays_out_in_n_installments_then_stops() {
        // Arrange
        let mut state = daily_state_with_sink();
        let giver = GrantGivingAgent::new("g", LocalWallet::boxed(30.0, 3.0).unwrap(), "dst", 2 * S_PER_DAY, 3).unwrap();
        state.add_agent(Box::new(giver)).unwrap();

        // Act: grants land on ticks 1, 3 and 5
        let mut usd_seen = Vec::new();
        for _ in 0..8 {
            state.tick().unwrap();
            usd_seen.push(state.agent("dst").unwrap().wallet().usd());
        }

        // Assert
        assert_eq!(usd_seen, vec![10.0, 10.0, 20.0, 20.0, 30.0, 30.0, 30.0, 30.0]);
        let g = state.agent_as::<GrantGivingAgent>("g").unwrap();
        assert!(g.is_done());
        assert_eq!(g.grants_made(), 3);
        assert_eq!(g.wallet().usd(), 0.0);
        assert_eq!(g.wallet().token(), 0.0);
        assert!((state.agent("dst").unwrap().wallet().token() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_actions_is_invalid() {
        let err = GrantGivingAgent::monthly("g", LocalWallet::boxed(1.0, 0.0).unwrap(), "dst", 0).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
    }
}
