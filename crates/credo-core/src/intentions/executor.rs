//! Intention executor: run one action for the top-ranked goal.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::{Action, ActionPolicy, ActionStatus, NotifyTopGoalPolicy};
use crate::desires::ScoredGoal;
use crate::error::CredoResult;
use crate::store::AuditStore;
use crate::types::ActionExecutionRecord;

/// What happened when an action ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action_type: String,
    pub goal_id: String,
    pub status: ActionStatus,
    /// Seconds spent in the action.
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// 0 or 1.
    pub actions_taken: u32,
    pub outcome: Option<ActionOutcome>,
}

impl ExecutionResult {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Runs at most one action per call. Never retries.
pub struct IntentionExecutor {
    actions: HashMap<String, Arc<dyn Action>>,
    policy: Box<dyn ActionPolicy>,
    audit: Arc<dyn AuditStore>,
}

impl IntentionExecutor {
    /// Executor with no registered actions and the notify-top-goal policy.
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self {
            actions: HashMap::new(),
            policy: Box::new(NotifyTopGoalPolicy),
            audit,
        }
    }

    /// Builder method to register an action under a type name.
    pub fn with_action(mut self, action_type: impl Into<String>, action: Arc<dyn Action>) -> Self {
        self.actions.insert(action_type.into(), action);
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn ActionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn has_action(&self, action_type: &str) -> bool {
        self.actions.contains_key(action_type)
    }

    /// Act on the first ranked goal only.
    ///
    /// No goals, no choice from the policy, or an unregistered action type
    /// all yield `actions_taken == 0` without side effects.
    pub async fn execute(&self, ranked: &[ScoredGoal]) -> CredoResult<ExecutionResult> {
        let Some(top) = ranked.first() else {
            debug!("No ranked goals, nothing to do");
            return Ok(ExecutionResult::none());
        };

        let Some(choice) = self.policy.select(&top.goal) else {
            debug!(goal_id = %top.goal.id, "Policy chose no action");
            return Ok(ExecutionResult::none());
        };

        let Some(action) = self.actions.get(&choice.action_type) else {
            debug!(
                goal_id = %top.goal.id,
                action_type = %choice.action_type,
                "Action type not registered, skipping"
            );
            return Ok(ExecutionResult::none());
        };

        let start = Instant::now();
        let status = action.run(&choice.params).await;
        let duration = start.elapsed().as_secs_f64();

        let outcome = ActionOutcome {
            action_type: choice.action_type.clone(),
            goal_id: top.goal.id.clone(),
            status,
            duration,
        };

        // The action already ran; a lost audit row does not undo it.
        let record = ActionExecutionRecord {
            action_type: outcome.action_type.clone(),
            status: outcome.status.to_string(),
            duration,
            result_summary: serde_json::json!({
                "goal_id": outcome.goal_id,
                "params": choice.params,
                "status": outcome.status,
            }),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.audit.record_execution(&record) {
            error!(
                goal_id = %outcome.goal_id,
                action_type = %outcome.action_type,
                code = e.code().as_str(),
                error = %e,
                "Failed to record action execution"
            );
        }

        info!(
            goal_id = %outcome.goal_id,
            action_type = %outcome.action_type,
            status = %outcome.status,
            duration_ms = (duration * 1000.0) as u64,
            "Intention executed"
        );

        Ok(ExecutionResult {
            actions_taken: 1,
            outcome: Some(outcome),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intentions::{ActionChoice, ActionParams, SimulatedAction, SEND_NOTIFICATION, SIMULATE_ACTION};
    use crate::store::SqliteStore;
    use crate::error::CredoError;
    use crate::types::{default_goals, Goal, OptimizationRecord};
    use async_trait::async_trait;
    use mockall::mock;
    use std::time::Duration;

    mock! {
        pub Audit {}

        impl AuditStore for Audit {
            fn record_optimization(&self, record: &OptimizationRecord) -> CredoResult<()>;
            fn record_execution(&self, record: &ActionExecutionRecord) -> CredoResult<()>;
            fn recent_executions(&self, limit: usize) -> CredoResult<Vec<ActionExecutionRecord>>;
            fn optimization_count(&self) -> CredoResult<u64>;
        }
    }

    struct Failing;

    #[async_trait]
    impl Action for Failing {
        async fn run(&self, _params: &ActionParams) -> ActionStatus {
            ActionStatus::failed("exit status 1")
        }
    }

    struct Nothing;

    impl ActionPolicy for Nothing {
        fn select(&self, _goal: &Goal) -> Option<ActionChoice> {
            None
        }
    }

    fn ranked() -> Vec<ScoredGoal> {
        default_goals().into_iter().map(ScoredGoal::new).collect()
    }

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_empty_ranking_takes_no_action() {
        let store = store();
        let executor = IntentionExecutor::new(store.clone())
            .with_action(SEND_NOTIFICATION, Arc::new(SimulatedAction::with_delay(Duration::ZERO)));

        let result = executor.execute(&[]).await.unwrap();
        assert_eq!(result, ExecutionResult::none());
        assert!(store.recent_executions(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_action_is_noop() {
        let store = store();
        let executor = IntentionExecutor::new(store.clone())
            .with_action(SIMULATE_ACTION, Arc::new(SimulatedAction::with_delay(Duration::ZERO)));
        assert!(!executor.has_action(SEND_NOTIFICATION));

        let result = executor.execute(&ranked()).await.unwrap();
        assert_eq!(result.actions_taken, 0);
        assert!(store.recent_executions(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_policy_may_decline() {
        let store = store();
        let executor = IntentionExecutor::new(store.clone())
            .with_action(SEND_NOTIFICATION, Arc::new(SimulatedAction::with_delay(Duration::ZERO)))
            .with_policy(Box::new(Nothing));

        assert_eq!(executor.execute(&ranked()).await.unwrap().actions_taken, 0);
    }

    #[tokio::test]
    async fn test_failed_action_is_recorded_once() {
        let store = store();
        let executor = IntentionExecutor::new(store.clone()).with_action(SEND_NOTIFICATION, Arc::new(Failing));

        let result = executor.execute(&ranked()).await.unwrap();
        assert_eq!(result.actions_taken, 1);
        let outcome = result.outcome.unwrap();
        assert_eq!(outcome.goal_id, "revenue_generation");
        assert_eq!(outcome.status, ActionStatus::failed("exit status 1"));

        let records = store.recent_executions(10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "failed: exit status 1");
        assert_eq!(records[0].result_summary["goal_id"], "revenue_generation");
    }

    #[tokio::test]
    async fn test_audit_failure_keeps_outcome() {
        let mut audit = MockAudit::new();
        audit
            .expect_record_execution()
            .withf(|record| record.action_type == SEND_NOTIFICATION && record.status == "simulated_success")
            .times(1)
            .returning(|_| Err(CredoError::database("disk I/O error")));

        let executor = IntentionExecutor::new(Arc::new(audit))
            .with_action(SEND_NOTIFICATION, Arc::new(SimulatedAction::with_delay(Duration::ZERO)));

        let result = executor.execute(&ranked()).await.unwrap();
        assert_eq!(result.actions_taken, 1);
        assert_eq!(result.outcome.unwrap().status, ActionStatus::SimulatedSuccess);
    }
}
