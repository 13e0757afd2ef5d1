//! Intentions: choose and run one action for the cycle's top goal.
//!
//! The pieces are kept separate so each can be replaced on its own:
//! - [`ActionPolicy`] maps a goal to an action type and parameters
//! - [`Action`] runs one kind of action
//! - [`IntentionExecutor`] ties them together and writes the audit record

mod actions;
mod executor;
mod policy;

pub use actions::{Action, Delivery, Notifier, NotifyAction, SimulatedAction};
pub use executor::{ActionOutcome, ExecutionResult, IntentionExecutor};
pub use policy::{ActionChoice, ActionPolicy, NotifyTopGoalPolicy};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Action type that sends a device notification.
pub const SEND_NOTIFICATION: &str = "send_notification";

/// Action type that only pretends to work.
pub const SIMULATE_ACTION: &str = "simulate_action";

/// String parameters handed to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(BTreeMap<String, String>);

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// How an action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ActionStatus {
    Success,
    Failed(String),
    SimulatedSuccess,
}

impl ActionStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::SimulatedSuccess => f.write_str("simulated_success"),
        }
    }
}

impl From<ActionStatus> for String {
    fn from(status: ActionStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for ActionStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "success" => Ok(Self::Success),
            "simulated_success" => Ok(Self::SimulatedSuccess),
            other => match other.strip_prefix("failed: ") {
                Some(reason) => Ok(Self::Failed(reason.to_string())),
                None if other == "failed" => Ok(Self::Failed(String::new())),
                None => Err(format!("unknown action status '{}'", other)),
            },
        }
    }
}
