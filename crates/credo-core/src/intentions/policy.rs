//! Goal to action mapping.

use serde::{Deserialize, Serialize};

use super::{ActionParams, SEND_NOTIFICATION};
use crate::types::Goal;

/// The action chosen for a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChoice {
    pub action_type: String,
    pub params: ActionParams,
}

/// Decides what to do about a goal. `None` means nothing.
pub trait ActionPolicy: Send + Sync {
    fn select(&self, goal: &Goal) -> Option<ActionChoice>;
}

/// Sends a notification naming the goal, whatever its type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyTopGoalPolicy;

impl ActionPolicy for NotifyTopGoalPolicy {
    fn select(&self, goal: &Goal) -> Option<ActionChoice> {
        Some(ActionChoice {
            action_type: SEND_NOTIFICATION.to_string(),
            params: ActionParams::new()
                .with("title", goal.name.as_str())
                .with("body", format!("Top goal this cycle. Priority: {:.2}", goal.priority)),
        })
    }
}
