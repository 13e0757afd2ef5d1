//! credo-core - Core library for credo.
//!
//! A small belief-desire-intention loop: observations are collected and
//! deduplicated (beliefs), goals are updated and ranked against what was
//! seen (desires), and one action is run for the top goal (intentions).
//!
//! # Example
//!
//! ```ignore
//! use credo_core::{BeliefAggregator, CycleCoordinator, DesireOptimizer, GoalRegistry,
//!     IntentionExecutor, SqliteStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("credo.db")?);
//! let registry = GoalRegistry::new(store.clone());
//! registry.seed_defaults()?;
//!
//! let mut coordinator = CycleCoordinator::new(
//!     BeliefAggregator::new(store.clone()),
//!     DesireOptimizer::new(registry, store.clone()),
//!     IntentionExecutor::new(store),
//! );
//! let report = coordinator.run_cycle().await?;
//! ```

pub mod beliefs;
pub mod config;
pub mod cycle;
pub mod desires;
pub mod error;
pub mod intentions;
pub mod planning;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use beliefs::{BeliefAggregator, ObservationSource};
pub use config::{AgentConfig, RemoteConfig, SourcesConfig};
pub use cycle::{CycleCoordinator, CyclePhase, CycleReport, CycleSettings, RemoteCoordinator};
pub use desires::{DesireOptimizer, GoalRegistry, OptimizationResult, ScoredGoal};
pub use error::{CredoError, CredoResult, ErrorCode};
pub use intentions::{
    Action, ActionParams, ActionPolicy, ActionStatus, Delivery, ExecutionResult, IntentionExecutor, Notifier,
    NotifyAction, NotifyTopGoalPolicy, SimulatedAction,
};
pub use planning::{select_solver, ActionPlanner, Candidate, Problem, Selection, Solver, SolverPreference};
pub use store::{AuditStore, GoalStore, ObservationStore, SqliteStore};
pub use types::{CycleSummary, Goal, GoalStatus, GoalType, Observation};
