//! Budgeted selection of candidate actions.
//!
//! A [`Problem`] is a 0/1 knapsack: pick a subset of candidates whose total
//! weight fits the capacity while maximizing total value. Two strategies
//! implement [`Solver`]:
//!
//! - [`ClassicalGreedy`]: ratio-ordered prefix, always available
//! - [`ExhaustiveSearch`]: exact search over all subsets for small problems
//!
//! [`select_solver`] picks once at startup and always keeps the greedy
//! solver as fallback.

mod chain;
mod exhaustive;
mod greedy;
mod planner;

pub use chain::{select_solver, SolverChain, SolverPreference};
pub use exhaustive::{ExhaustiveSearch, MAX_EXHAUSTIVE_CANDIDATES};
pub use greedy::ClassicalGreedy;
pub use planner::{default_templates, ActionPlan, ActionPlanner, ActionTemplate, PlannedAction, DEFAULT_PLAN_CAPACITY};

use serde::{Deserialize, Serialize};

/// Slack allowed when comparing float weights against capacity.
pub(crate) const CAPACITY_EPSILON: f64 = 1e-9;

/// Something that can be selected at a cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    /// Cost counted against the capacity.
    pub weight: f64,
    /// Benefit of selecting this candidate.
    pub value: f64,
}

impl Candidate {
    pub fn new(id: impl Into<String>, weight: f64, value: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            value,
        }
    }

    /// Value per unit of weight. Weightless candidates rank first.
    pub fn ratio(&self) -> f64 {
        if self.weight <= 0.0 {
            f64::INFINITY
        } else {
            self.value / self.weight
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub candidates: Vec<Candidate>,
    pub capacity: f64,
}

impl Problem {
    pub fn new(candidates: Vec<Candidate>, capacity: f64) -> Self {
        Self { candidates, capacity }
    }

    fn fits(&self, weight: f64) -> bool {
        weight <= self.capacity + CAPACITY_EPSILON
    }
}

/// Chosen subset, shaped the same whichever solver produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: Vec<Candidate>,
    pub total_weight: f64,
    pub total_value: f64,
    /// Name of the solver that produced the selection.
    pub method: String,
}

impl Selection {
    pub fn from_candidates(selected: Vec<Candidate>, method: impl Into<String>) -> Self {
        let total_weight: f64 = selected.iter().map(|c| c.weight).sum();
        let total_value: f64 = selected.iter().map(|c| c.value).sum();
        Self {
            selected,
            total_weight,
            total_value,
            method: method.into(),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.selected.iter().map(|c| c.id.as_str()).collect()
    }
}

/// A selection strategy.
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this solver can handle the problem.
    fn is_available(&self, problem: &Problem) -> bool;

    /// Select a subset whose total weight fits the capacity.
    fn solve(&self, problem: &Problem) -> Selection;
}
