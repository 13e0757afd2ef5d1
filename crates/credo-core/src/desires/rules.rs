//! Per-type value rules.
//!
//! Each rule is a pure function of the goal's current value and the cycle
//! summary. Bounded kinds clamp to `[0, 100]`; financial values never clamp.

use std::collections::HashMap;

use crate::types::{CycleSummary, GoalType};

/// `(current_value, summary) -> new current_value`
pub type ValueRule = fn(f64, &CycleSummary) -> f64;

/// Upper bound for performance and quality values.
pub const BOUNDED_MAX: f64 = 100.0;

/// Largest per-cycle performance gain.
pub const PERFORMANCE_STEP_CAP: f64 = 5.0;

/// Performance improves with how much was observed, capped per cycle.
pub fn performance(current: f64, summary: &CycleSummary) -> f64 {
    if summary.beliefs_processed == 0 {
        return current;
    }
    let step = (summary.beliefs_processed as f64 * 0.1).min(PERFORMANCE_STEP_CAP);
    raise_bounded(current, step)
}

/// Financial value grows with new beliefs. Unbounded.
pub fn financial(current: f64, summary: &CycleSummary) -> f64 {
    current + summary.new_beliefs as f64 * 10.0
}

/// Quality ticks up on a clean cycle and drops by a flat 2 on any error.
pub fn quality(current: f64, summary: &CycleSummary) -> f64 {
    if summary.errors == 0 {
        raise_bounded(current, 1.0)
    } else {
        lower_bounded(current, 2.0)
    }
}

/// Add `step`, capped at [`BOUNDED_MAX`]. A value already above the cap is
/// left alone rather than pulled down.
fn raise_bounded(current: f64, step: f64) -> f64 {
    (current + step).clamp(0.0, BOUNDED_MAX).max(current)
}

/// Subtract `step`, floored at 0. A value already below 0 is left alone
/// rather than lifted up.
fn lower_bounded(current: f64, step: f64) -> f64 {
    (current - step).clamp(0.0, BOUNDED_MAX).min(current)
}

/// Dispatch table from goal type to value rule.
#[derive(Clone)]
pub struct RuleTable {
    rules: HashMap<GoalType, ValueRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::empty()
            .with_rule(GoalType::Performance, performance)
            .with_rule(GoalType::Financial, financial)
            .with_rule(GoalType::Quality, quality)
    }
}

impl RuleTable {
    /// A table with no rules; every goal keeps its value.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Builder method to add or replace the rule for a goal type.
    pub fn with_rule(mut self, goal_type: GoalType, rule: ValueRule) -> Self {
        self.rules.insert(goal_type, rule);
        self
    }

    pub fn has_rule(&self, goal_type: &GoalType) -> bool {
        self.rules.contains_key(goal_type)
    }

    /// New current value for a goal of `goal_type`. Unknown types are unchanged.
    pub fn apply(&self, goal_type: &GoalType, current: f64, summary: &CycleSummary) -> f64 {
        match self.rules.get(goal_type) {
            Some(rule) => rule(current, summary),
            None => current,
        }
    }
}
