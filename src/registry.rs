// src/registry.rs

//! Agents keyed by name, iterated in insertion order.

use std::collections::HashMap;

use crate::agents::agent_trait::Agent;
use crate::error::{SimError, SimResult};

/// Ordered name list plus a name -> agent map for fast lookups.
///
/// A slot holds `None` while its agent is checked out for stepping, so the
/// stepping agent can be handed `&mut SimState` without aliasing itself.
#[derive(Default)]
pub struct AgentRegistry {
    order: Vec<String>,
    slots: HashMap<String, Option<Box<dyn Agent>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Box<dyn Agent>) -> SimResult<()> {
        let name = agent.name().to_string();
        if self.slots.contains_key(&name) {
            return Err(SimError::invalid(format!("agent name '{name}' is already taken")));
        }
        self.order.push(name.clone());
        self.slots.insert(name, Some(agent));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&dyn Agent> {
        self.slots.get(name)?.as_deref()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Agent> {
        match self.slots.get_mut(name) {
            Some(Some(agent)) => Some(agent.as_mut()),
            _ => None,
        }
    }

    /// Agents in insertion order, skipping any that are checked out.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Agent> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.slots.get(name).and_then(|slot| slot.as_deref()))
    }

    pub fn checkout(&mut self, name: &str) -> SimResult<Box<dyn Agent>> {
        match self.slots.get_mut(name) {
            None => Err(SimError::invalid(format!("no agent named '{name}'"))),
            Some(slot) => slot
                .take()
                .ok_or_else(|| SimError::invalid(format!("agent '{name}' is already checked out"))),
        }
    }

    pub fn checkin(&mut self, agent: Box<dyn Agent>) {
        let name = agent.name().to_string();
        if !self.slots.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.slots.insert(name, Some(agent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::burner_agent::BurnerAgent;

    fn registry_of(names: &[&str]) -> AgentRegistry {
        let mut reg = AgentRegistry::new();
        for name in names {
            reg.insert(Box::new(BurnerAgent::new(*name))).unwrap();
        }
        reg
    }

    #[test]
    fn duplicate_insert_is_rejected_and_changes_nothing() {
        // Arrange
        let mut reg = registry_of(&["a", "b"]);

        // Act
        let err = reg.insert(Box::new(BurnerAgent::new("a"))).unwrap_err();

        // Assert
        assert!(matches!(err, SimError::InvalidArgument(_)));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn checkout_of_an_unknown_name_fails() {
        let mut reg = registry_of(&["a"]);
        assert!(matches!(reg.checkout("zzz"), Err(SimError::InvalidArgument(_))));
        assert!(reg.get("a").is_some());
    }

    #[test]
    fn double_checkout_fails_until_checkin() {
        let mut reg = registry_of(&["a"]);

        let agent = reg.checkout("a").unwrap();
        assert!(reg.checkout("a").is_err());
        assert!(reg.contains("a"));
        assert!(reg.get("a").is_none());
        reg.checkin(agent);

        assert!(reg.checkout("a").is_ok());
    }

    #[test]
    fn checkout_and_checkin_keep_insertion_order() {
        // Arrange
        let mut reg = registry_of(&["a", "b", "c"]);

        // Act: step the middle agent, then the first
        let b = reg.checkout("b").unwrap();
        let visible: Vec<String> = reg.iter().map(|a| a.name().to_string()).collect();
        reg.checkin(b);
        let a = reg.checkout("a").unwrap();
        reg.checkin(a);

        // Assert
        assert_eq!(visible, vec!["a".to_string(), "c".to_string()]);
        let order: Vec<&str> = reg.iter().map(|a| a.name()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn checkin_of_a_new_agent_appends_it() {
        let mut reg = registry_of(&["a"]);
        reg.checkin(Box::new(BurnerAgent::new("z")));
        assert_eq!(reg.names(), &["a".to_string(), "z".to_string()]);
    }
}
