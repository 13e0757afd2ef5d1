//! Desires: the goal registry and the optimizer that ranks goals each cycle.

pub mod optimizer;
pub mod registry;
pub mod rules;
pub mod scoring;

pub use optimizer::{DesireOptimizer, OptimizationResult, SkippedGoal, DEFAULT_METHOD, DEFAULT_TOP_K};
pub use registry::GoalRegistry;
pub use rules::{RuleTable, ValueRule};
pub use scoring::ScoredGoal;
