//! Desire optimizer: update values, adjust priorities, rank.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::registry::GoalRegistry;
use super::rules::RuleTable;
use super::scoring::{self, ScoredGoal};
use crate::error::{CredoError, CredoResult};
use crate::store::AuditStore;
use crate::types::{CycleSummary, Goal, OptimizationRecord};

/// Label recorded when no method is configured.
pub const DEFAULT_METHOD: &str = "lightweight_weighted_scoring";

/// Number of goals reported as the cycle's top goals.
pub const DEFAULT_TOP_K: usize = 5;

/// A goal left out of this cycle's ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedGoal {
    pub goal_id: String,
    pub reason: String,
}

/// Output of one optimization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Every scored goal, best first.
    pub ranked: Vec<ScoredGoal>,
    /// The first `top_k` entries of `ranked`.
    pub top: Vec<ScoredGoal>,
    pub method: String,
    /// Seconds spent optimizing.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedGoal>,
}

impl OptimizationResult {
    pub fn top_goal(&self) -> Option<&ScoredGoal> {
        self.ranked.first()
    }
}

/// Ranks active goals against a cycle summary.
pub struct DesireOptimizer {
    registry: GoalRegistry,
    audit: Arc<dyn AuditStore>,
    rules: RuleTable,
    method: String,
    top_k: usize,
}

impl DesireOptimizer {
    pub fn new(registry: GoalRegistry, audit: Arc<dyn AuditStore>) -> Self {
        Self {
            registry,
            audit,
            rules: RuleTable::default(),
            method: DEFAULT_METHOD.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Builder method to set the method label. The label never changes
    /// the formulas.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Apply one cycle's value update to a goal and raise its priority.
    pub fn update_goal(&self, goal: &Goal, summary: &CycleSummary) -> CredoResult<Goal> {
        if !goal.is_finite() {
            return Err(CredoError::invalid_goal(&goal.id, "non-finite value before update"));
        }

        let mut updated = goal.clone();
        updated.current_value = self.rules.apply(&goal.goal_type, goal.current_value, summary);
        updated.priority = scoring::adjusted_priority(&updated);
        updated.updated_at = Utc::now();

        if !updated.is_finite() {
            return Err(CredoError::invalid_goal(&goal.id, "non-finite value after update"));
        }
        Ok(updated)
    }

    /// Run one optimization pass over the active goals.
    ///
    /// A goal that cannot be updated or persisted is skipped. Failing to
    /// list goals or to write the audit record fails the pass.
    pub fn optimize(&self, summary: &CycleSummary) -> CredoResult<OptimizationResult> {
        let start = Instant::now();
        let goals = self.registry.list_active()?;

        let mut snapshot = Vec::with_capacity(goals.len());
        let mut skipped = Vec::new();

        for goal in &goals {
            let updated = match self
                .update_goal(goal, summary)
                .and_then(|updated| self.registry.upsert(&updated).map(|_| updated))
            {
                Ok(updated) => updated,
                Err(e) => {
                    warn!(goal_id = %goal.id, code = e.code().as_str(), error = %e, "Skipping goal");
                    skipped.push(SkippedGoal {
                        goal_id: goal.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            debug!(
                goal_id = %updated.id,
                current = updated.current_value,
                priority = updated.priority,
                "Goal updated"
            );
            snapshot.push(updated);
        }

        let mut ranked: Vec<ScoredGoal> = snapshot.iter().cloned().map(ScoredGoal::new).collect();
        scoring::rank(&mut ranked);
        let top = ranked.iter().take(self.top_k).cloned().collect();

        let result = OptimizationResult {
            ranked,
            top,
            method: self.method.clone(),
            duration: start.elapsed().as_secs_f64(),
            skipped,
        };

        self.audit.record_optimization(&OptimizationRecord {
            goals_snapshot: snapshot,
            result: serde_json::to_value(&result)?,
            method: result.method.clone(),
            duration: result.duration,
            timestamp: Utc::now(),
        })?;

        match result.top_goal() {
            Some(top) => info!(
                goals = result.ranked.len(),
                skipped = result.skipped.len(),
                top_goal = %top.goal.id,
                top_score = top.score,
                method = %result.method,
                "Desires optimized"
            ),
            None => info!(method = %result.method, "No active goals to optimize"),
        }

        Ok(result)
    }
}
