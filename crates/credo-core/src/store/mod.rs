//! Storage traits and the SQLite implementation.
//!
//! Four tables back the loop:
//! - `beliefs`: deduplicated observations (append + point lookup)
//! - `desires`: one row per goal (upsert + ordered scan)
//! - `desire_optimizations` / `action_executions`: write-once audit trail

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::CredoResult;
use crate::types::{ActionExecutionRecord, Goal, Observation, OptimizationRecord};

/// Append-only log of deduplicated observations.
pub trait ObservationStore: Send + Sync {
    /// Whether an observation with this id is already stored.
    fn contains(&self, id: &str) -> CredoResult<bool>;

    /// Store an observation. Returns `false` if the id already existed.
    fn insert(&self, observation: &Observation) -> CredoResult<bool>;

    /// Total number of stored observations.
    fn count(&self) -> CredoResult<u64>;
}

/// Durable set of goals.
pub trait GoalStore: Send + Sync {
    /// Insert a goal, or update the mutable fields of an existing one.
    ///
    /// `id`, `type`, `target_value` and `created_at` are never changed for an
    /// existing row.
    fn upsert(&self, goal: &Goal) -> CredoResult<()>;

    /// Get a goal by id.
    fn get(&self, id: &str) -> CredoResult<Option<Goal>>;

    /// Active goals, priority descending (insertion order on ties).
    fn list_active(&self) -> CredoResult<Vec<Goal>>;

    /// Number of goals regardless of status.
    fn count(&self) -> CredoResult<u64>;
}

/// Write-once audit trail for optimizations and actions.
pub trait AuditStore: Send + Sync {
    fn record_optimization(&self, record: &OptimizationRecord) -> CredoResult<()>;

    fn record_execution(&self, record: &ActionExecutionRecord) -> CredoResult<()>;

    /// Most recent action executions, newest first.
    fn recent_executions(&self, limit: usize) -> CredoResult<Vec<ActionExecutionRecord>>;

    fn optimization_count(&self) -> CredoResult<u64>;
}
