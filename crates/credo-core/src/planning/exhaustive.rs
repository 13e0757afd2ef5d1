//! Exact subset search for small problems.

use super::{Candidate, Problem, Selection, Solver};

/// Largest problem the exhaustive solver accepts.
pub const MAX_EXHAUSTIVE_CANDIDATES: usize = 20;

/// Enumerates every subset and keeps the highest-value one that fits.
///
/// Equivalent to minimizing the diagonal QUBO `sum_i x_i * (cost_i - value_i)`
/// under the capacity constraint, solved by brute force.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSearch {
    max_candidates: usize,
}

impl Default for ExhaustiveSearch {
    fn default() -> Self {
        Self {
            max_candidates: MAX_EXHAUSTIVE_CANDIDATES,
        }
    }
}

impl ExhaustiveSearch {
    pub const NAME: &'static str = "exhaustive_search";

    /// Limit the problem size (capped at [`MAX_EXHAUSTIVE_CANDIDATES`]).
    pub fn with_max_candidates(max_candidates: usize) -> Self {
        Self {
            max_candidates: max_candidates.min(MAX_EXHAUSTIVE_CANDIDATES),
        }
    }
}

impl Solver for ExhaustiveSearch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self, problem: &Problem) -> bool {
        problem.candidates.len() <= self.max_candidates
    }

    fn solve(&self, problem: &Problem) -> Selection {
        let n = problem.candidates.len().min(self.max_candidates);
        let mut best_mask: u32 = 0;
        let mut best_value = 0.0;

        for mask in 1u32..(1u32 << n) {
            let (weight, value) = (0..n)
                .filter(|&i| mask & (1u32 << i) != 0)
                .map(|i| &problem.candidates[i])
                .fold((0.0, 0.0), |(w, v), c| (w + c.weight, v + c.value));

            if problem.fits(weight) && value > best_value {
                best_value = value;
                best_mask = mask;
            }
        }

        let selected: Vec<Candidate> = (0..n)
            .filter(|&i| best_mask & (1u32 << i) != 0)
            .map(|i| problem.candidates[i].clone())
            .collect();

        Selection::from_candidates(selected, Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::ClassicalGreedy;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_beats_greedy_when_prefix_is_poor() {
        let problem = Problem::new(
            vec![
                Candidate::new("best", 1.0, 10.0),
                Candidate::new("big", 5.0, 20.0),
                Candidate::new("small", 0.5, 0.5),
            ],
            2.0,
        );
        let selection = ExhaustiveSearch::default().solve(&problem);
        assert_eq!(selection.ids(), vec!["best", "small"]);
        assert_eq!(selection.total_value, 10.5);
    }

    #[test]
    fn test_unavailable_above_limit() {
        let candidates = (0..21).map(|i| Candidate::new(i.to_string(), 1.0, 1.0)).collect();
        let problem = Problem::new(candidates, 5.0);
        assert!(!ExhaustiveSearch::default().is_available(&problem));
        assert!(!ExhaustiveSearch::with_max_candidates(4).is_available(&Problem::new(
            (0..5).map(|i| Candidate::new(i.to_string(), 1.0, 1.0)).collect(),
            1.0
        )));
    }

    #[test]
    fn test_never_worse_than_greedy() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let n = rng.gen_range(1..10);
            let candidates = (0..n)
                .map(|i| Candidate::new(format!("c{}", i), rng.gen_range(0.01..1.0), rng.gen_range(0.0..1.0)))
                .collect();
            let problem = Problem::new(candidates, rng.gen_range(0.0..2.0));

            let exact = ExhaustiveSearch::default().solve(&problem);
            let greedy = ClassicalGreedy.solve(&problem);
            assert!(exact.total_weight <= problem.capacity + 1e-9);
            assert!(exact.total_value + 1e-9 >= greedy.total_value);
        }
    }
}
