//! The belief → desire → intention cycle and its run loop.

mod coordinator;

pub use coordinator::{CycleCoordinator, RunStats};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::CredoResult;
use crate::planning::ActionPlan;
use crate::types::CycleSummary;

/// Component name used when reporting status.
pub const DEFAULT_COMPONENT: &str = "bdi_agent";

/// Where the coordinator is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    Collecting,
    Optimizing,
    Acting,
    Reporting,
    Sleeping,
    Aborting,
}

/// Cross-process coordination. Every call is best-effort.
#[async_trait]
pub trait RemoteCoordinator: Send + Sync {
    /// Post `{component, status, metrics}` to the remote status endpoint.
    async fn report_status(&self, component: &str, status: &str, metrics: serde_json::Value) -> CredoResult<()>;

    /// Kick off the remote job. Returns whether the remote accepted it.
    async fn trigger_remote_job(&self) -> CredoResult<bool>;
}

/// Loop timing and reporting settings.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Target wall-clock time from one cycle start to the next.
    pub interval: Duration,
    /// Sleep after a failed or panicked cycle.
    pub error_backoff: Duration,
    /// Trigger the remote job every N successful cycles.
    pub trigger_every_cycles: Option<u64>,
    pub component: String,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            error_backoff: Duration::from_secs(60),
            trigger_every_cycles: None,
            component: DEFAULT_COMPONENT.to_string(),
        }
    }
}

impl CycleSettings {
    /// Sleep before the next cycle, given how long this one took.
    pub fn sleep_after(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }

    /// Whether the `n`-th successful cycle (1-based) should trigger the remote job.
    pub fn should_trigger(&self, n: u64) -> bool {
        matches!(self.trigger_every_cycles, Some(every) if every > 0 && n > 0 && n % every == 0)
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub id: Uuid,
    /// 1-based cycle number.
    pub cycle: u64,
    pub summary: CycleSummary,
    pub top_goal: Option<String>,
    pub actions_taken: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ActionPlan>,
    /// Set when optimization failed; no action was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds spent in the cycle.
    pub duration: f64,
}

impl CycleReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Metrics payload sent with the status report.
    pub fn metrics(&self) -> serde_json::Value {
        serde_json::json!({
            "cycle": self.cycle,
            "beliefs_processed": self.summary.beliefs_processed,
            "new_beliefs": self.summary.new_beliefs,
            "errors": self.summary.errors,
            "top_goal": self.top_goal,
            "actions_taken": self.actions_taken,
            "planned_actions": self.plan.as_ref().map(|p| p.actions.len()).unwrap_or(0),
            "duration": self.duration,
            "error": self.error,
        })
    }
}
