// src/agents/minter_agent.rs

use std::any::Any;

use tracing::debug;

use super::{
    agent_trait::Agent, agent_type::AgentKind, config::MINTER_S_BETWEEN_MINTS, mint_schedule::MintSchedule,
    timer::ActionTimer,
};
use crate::error::{SimError, SimResult};
use crate::sim_state::SimState;
use crate::wallet::{Currency, Wallet};

/// Mints new token along a release schedule and hands it to one receiver.
#[derive(Debug)]
pub struct MinterAgent {
    name: String,
    wallet: Box<dyn Wallet>,
    receiver: String,
    total: f64,
    minted: f64,
    schedule: MintSchedule,
    timer: ActionTimer,
}

impl MinterAgent {
    pub fn new(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        receiver: impl Into<String>,
        total: f64,
        schedule: MintSchedule,
    ) -> SimResult<Self> {
        Self::with_period(name, wallet, receiver, total, schedule, MINTER_S_BETWEEN_MINTS)
    }

    pub fn with_period(
        name: impl Into<String>,
        wallet: Box<dyn Wallet>,
        receiver: impl Into<String>,
        total: f64,
        schedule: MintSchedule,
        s_between_mints: u64,
    ) -> SimResult<Self> {
        if !total.is_finite() || total < 0.0 {
            return Err(SimError::invalid(format!("mint cap must be finite and non-negative, got {total}")));
        }
        schedule.validate()?;
        Ok(Self {
            name: name.into(),
            wallet,
            receiver: receiver.into(),
            total,
            minted: 0.0,
            schedule,
            timer: ActionTimer::new(s_between_mints),
        })
    }

    pub fn minted(&self) -> f64 {
        self.minted
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn schedule(&self) -> &MintSchedule {
        &self.schedule
    }

    fn mint(&mut self, state: &mut SimState) -> SimResult<()> {
        let target = self.total * self.schedule.fraction(state.elapsed_years());
        let amount = (target - self.minted).min(self.total - self.minted);
        if amount <= 0.0 {
            return Ok(());
        }

        self.wallet.deposit(Currency::Token, amount)?;
        let dst = state.wallet_mut(&self.receiver)?;
        let moved = self.wallet.transfer(dst, Currency::Token, amount)?;
        self.minted += moved;
        state.record_mint(moved);
        debug!(minter = %self.name, receiver = %self.receiver, amount = moved, minted = self.minted, "minted");
        Ok(())
    }
}

impl Agent for MinterAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Minter
    }

    fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    fn wallet_mut(&mut self) -> &mut dyn Wallet {
        self.wallet.as_mut()
    }

    fn take_step(&mut self, state: &mut SimState) -> SimResult<()> {
        self.timer.advance(state.time_step());
        if self.timer.is_due() {
            self.timer.reset();
            self.mint(state)?;
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
