//! Goal registry backed by a [`GoalStore`].

use std::sync::Arc;
use tracing::info;

use crate::error::CredoResult;
use crate::store::GoalStore;
use crate::types::{default_goals, Goal};

/// Durable set of named goals.
#[derive(Clone)]
pub struct GoalRegistry {
    store: Arc<dyn GoalStore>,
}

impl GoalRegistry {
    pub fn new(store: Arc<dyn GoalStore>) -> Self {
        Self { store }
    }

    /// Active goals, highest priority first.
    pub fn list_active(&self) -> CredoResult<Vec<Goal>> {
        self.store.list_active()
    }

    pub fn get(&self, id: &str) -> CredoResult<Option<Goal>> {
        self.store.get(id)
    }

    pub fn upsert(&self, goal: &Goal) -> CredoResult<()> {
        self.store.upsert(goal)
    }

    /// Insert the starter goals if the registry holds no goals at all.
    ///
    /// Returns how many goals were written (0 when already seeded).
    pub fn seed_defaults(&self) -> CredoResult<usize> {
        if self.store.count()? > 0 {
            return Ok(0);
        }

        let goals = default_goals();
        for goal in &goals {
            self.store.upsert(goal)?;
        }
        info!(count = goals.len(), "Seeded default goals");
        Ok(goals.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::{GoalStatus, GoalType};

    fn registry() -> GoalRegistry {
        GoalRegistry::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let registry = registry();
        assert_eq!(registry.seed_defaults().unwrap(), 4);
        assert_eq!(registry.seed_defaults().unwrap(), 0);
        assert_eq!(registry.list_active().unwrap().len(), 4);
    }

    #[test]
    fn test_seed_skipped_when_any_goal_exists() {
        let registry = registry();
        let custom = Goal::new("custom", "Custom", GoalType::Quality, 10.0, 0.0)
            .with_status(GoalStatus::Inactive);
        registry.upsert(&custom).unwrap();

        assert_eq!(registry.seed_defaults().unwrap(), 0);
        assert!(registry.list_active().unwrap().is_empty());
    }

    #[test]
    fn test_list_active_priority_descending() {
        let registry = registry();
        registry.seed_defaults().unwrap();
        let bumped = registry
            .get("cost_optimization")
            .unwrap()
            .unwrap()
            .with_priority(0.95);
        registry.upsert(&bumped).unwrap();

        let active = registry.list_active().unwrap();
        assert_eq!(active[0].id, "cost_optimization");
        assert!(active.windows(2).all(|w| w[0].priority >= w[1].priority));
    }
}
