//! Append-only audit records.
//!
//! Neither record is read back by the loop; they exist so an operator can see
//! what each cycle ranked and did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::goal::Goal;

/// Snapshot of one optimization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecord {
    /// Goals after the value/priority update, before ranking.
    pub goals_snapshot: Vec<Goal>,
    /// Ranked result (serialized `OptimizationResult`).
    pub result: serde_json::Value,
    /// Configured method label.
    pub method: String,
    /// Seconds spent optimizing.
    pub duration: f64,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one action execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionExecutionRecord {
    pub action_type: String,
    /// `success`, `failed: <reason>` or `simulated_success`.
    pub status: String,
    /// Seconds spent in the action.
    pub duration: f64,
    pub result_summary: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
