//! Goal (desire) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Kind of goal, which selects the value rule applied each cycle.
///
/// Unknown kinds are kept verbatim so goals created by newer versions still
/// round-trip through storage; they simply get no value rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    Financial,
    Performance,
    Quality,
    Other(String),
}

impl GoalType {
    pub fn as_str(&self) -> &str {
        match self {
            GoalType::Financial => "financial",
            GoalType::Performance => "performance",
            GoalType::Quality => "quality",
            GoalType::Other(name) => name,
        }
    }

    /// Whether `current_value` for this kind lives on a 0-100 scale.
    pub fn is_bounded(&self) -> bool {
        matches!(self, GoalType::Performance | GoalType::Quality)
    }
}

impl From<&str> for GoalType {
    fn from(s: &str) -> Self {
        match s {
            "financial" => GoalType::Financial,
            "performance" => GoalType::Performance,
            "quality" => GoalType::Quality,
            other => GoalType::Other(other.to_string()),
        }
    }
}

impl From<String> for GoalType {
    fn from(s: String) -> Self {
        GoalType::from(s.as_str())
    }
}

impl From<GoalType> for String {
    fn from(t: GoalType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for GoalType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GoalType::from(s))
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a goal takes part in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Inactive,
}

/// A named goal with target/current value, priority and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier, fixed at creation.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Kind of goal, fixed at creation.
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    /// Value the goal is working towards, fixed at creation.
    pub target_value: f64,
    /// Where the goal stands now.
    pub current_value: f64,
    /// Accumulated urgency in `[0, 1]`.
    pub priority: f64,
    /// Static importance, `>= 0`.
    pub weight: f64,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create an active goal with default priority (0.5) and weight (1.0).
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        goal_type: GoalType,
        target_value: f64,
        current_value: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            goal_type,
            target_value,
            current_value,
            priority: 0.5,
            weight: 1.0,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method to set priority (clamped to `[0, 1]`).
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set weight (negative weights become 0).
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    /// Builder method to set status.
    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    /// Absolute distance between target and current value.
    pub fn gap(&self) -> f64 {
        (self.target_value - self.current_value).abs()
    }

    /// Whether every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.target_value.is_finite()
            && self.current_value.is_finite()
            && self.priority.is_finite()
            && self.weight.is_finite()
    }
}

/// The starter goal set written on first run.
pub fn default_goals() -> Vec<Goal> {
    vec![
        Goal::new("revenue_generation", "Revenue Generation", GoalType::Financial, 50_000.0, 0.0)
            .with_priority(0.9)
            .with_weight(1.0),
        Goal::new("system_efficiency", "System Efficiency", GoalType::Performance, 95.0, 80.0)
            .with_priority(0.8)
            .with_weight(0.8),
        Goal::new("user_satisfaction", "User Satisfaction", GoalType::Quality, 90.0, 75.0)
            .with_priority(0.7)
            .with_weight(0.6),
        Goal::new("cost_optimization", "Cost Optimization", GoalType::Financial, 0.0, 100.0)
            .with_priority(0.6)
            .with_weight(0.5),
    ]
}
