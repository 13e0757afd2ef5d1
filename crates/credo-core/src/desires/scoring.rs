//! Urgency, priority adjustment and ranking score.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::types::Goal;

/// How much a fully unmet goal adds to its priority per cycle.
pub const URGENCY_STEP: f64 = 0.1;

const PRIORITY_WEIGHT: f64 = 0.4;
const GAP_WEIGHT: f64 = 0.4;
const STATIC_WEIGHT: f64 = 0.2;

/// Gap relative to the target's magnitude (targets below 1 count as 1).
pub fn urgency(goal: &Goal) -> f64 {
    goal.gap() / goal.target_value.abs().max(1.0)
}

/// Priority after this cycle's urgency is added. Never decreases.
pub fn adjusted_priority(goal: &Goal) -> f64 {
    (goal.priority + urgency(goal) * URGENCY_STEP).clamp(0.0, 1.0)
}

/// Gap normalized by the larger of target and current magnitude.
pub fn gap_score(goal: &Goal) -> f64 {
    let scale = goal.target_value.abs().max(goal.current_value.abs()).max(1.0);
    goal.gap() / scale
}

/// Ranking score in `[0, 1]`.
pub fn score(goal: &Goal) -> f64 {
    (goal.priority * PRIORITY_WEIGHT + gap_score(goal) * GAP_WEIGHT + goal.weight * STATIC_WEIGHT)
        .clamp(0.0, 1.0)
}

/// A goal together with its ranking score for this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGoal {
    #[serde(flatten)]
    pub goal: Goal,
    pub score: f64,
}

impl ScoredGoal {
    pub fn new(goal: Goal) -> Self {
        let score = score(&goal);
        Self { goal, score }
    }

    pub fn id(&self) -> &str {
        &self.goal.id
    }
}

/// Sort descending by score. Equal scores keep their input order.
pub fn rank(scored: &mut [ScoredGoal]) {
    scored.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
}
