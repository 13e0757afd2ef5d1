//! Startup-time solver selection with greedy fallback.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

use super::{ClassicalGreedy, ExhaustiveSearch, Problem, Selection, Solver};

/// Which solver to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SolverPreference {
    /// Use the accelerated solver when it can take the problem.
    #[default]
    Auto,
    /// Greedy only.
    Classical,
    /// Same chain as `Auto`; the preference is logged as explicit.
    Accelerated,
}

/// A preferred solver backed by the greedy solver.
pub struct SolverChain {
    primary: Option<Box<dyn Solver>>,
    fallback: ClassicalGreedy,
}

impl SolverChain {
    pub fn classical() -> Self {
        Self {
            primary: None,
            fallback: ClassicalGreedy,
        }
    }

    pub fn with_primary(primary: Box<dyn Solver>) -> Self {
        Self {
            primary: Some(primary),
            fallback: ClassicalGreedy,
        }
    }

    /// Name of the preferred solver.
    pub fn primary_name(&self) -> &str {
        self.primary
            .as_ref()
            .map(|p| p.name())
            .unwrap_or(ClassicalGreedy::NAME)
    }

    fn pick(&self, problem: &Problem) -> &dyn Solver {
        match &self.primary {
            Some(primary) if primary.is_available(problem) => &**primary,
            Some(primary) => {
                debug!(
                    solver = primary.name(),
                    candidates = problem.candidates.len(),
                    "Preferred solver unavailable, using greedy"
                );
                &self.fallback
            }
            None => &self.fallback,
        }
    }
}

impl Solver for SolverChain {
    fn name(&self) -> &str {
        self.primary_name()
    }

    fn is_available(&self, _problem: &Problem) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Selection {
        self.pick(problem).solve(problem)
    }
}

/// Build the solver chain for the process. Call once at startup.
pub fn select_solver(preference: SolverPreference) -> SolverChain {
    let chain = match preference {
        SolverPreference::Classical => SolverChain::classical(),
        SolverPreference::Auto | SolverPreference::Accelerated => {
            SolverChain::with_primary(Box::new(ExhaustiveSearch::default()))
        }
    };
    info!(%preference, solver = chain.primary_name(), "Solver selected");
    chain
}
