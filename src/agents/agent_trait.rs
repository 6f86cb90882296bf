// src/agents/agent_trait.rs

use std::any::Any;

use super::agent_type::AgentKind;
use crate::error::SimResult;
use crate::sim_state::SimState;
use crate::wallet::Wallet;

/// The core trait that every participant in the economy implements.
///
/// Each agent owns exactly one wallet. While `take_step` runs the agent is
/// checked out of the registry, so it may freely look up and mutate *other*
/// agents through `state`.
pub trait Agent {
    fn name(&self) -> &str;
    fn kind(&self) -> AgentKind;

    fn wallet(&self) -> &dyn Wallet;
    fn wallet_mut(&mut self) -> &mut dyn Wallet;

    /// Advance this agent by one tick of `state.time_step()` seconds.
    fn take_step(&mut self, state: &mut SimState) -> SimResult<()>;

    // === Downcasting for the few places that need a concrete agent ===
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
