//! Ratio-ordered greedy selection.

use ordered_float::OrderedFloat;

use super::{Candidate, Problem, Selection, Solver};

/// Sorts by value/weight and takes the longest prefix that fits.
///
/// Stops at the first candidate that does not fit, so the result is always a
/// prefix of the ratio order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalGreedy;

impl ClassicalGreedy {
    pub const NAME: &'static str = "classical_greedy";

    /// Candidates ordered by ratio, descending. Ties keep input order.
    pub fn ratio_order(candidates: &[Candidate]) -> Vec<Candidate> {
        let mut ordered = candidates.to_vec();
        ordered.sort_by(|a, b| OrderedFloat(b.ratio()).cmp(&OrderedFloat(a.ratio())));
        ordered
    }
}

impl Solver for ClassicalGreedy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self, _problem: &Problem) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Selection {
        let mut selected = Vec::new();
        let mut used = 0.0;

        for candidate in Self::ratio_order(&problem.candidates) {
            if !problem.fits(used + candidate.weight) {
                break;
            }
            used += candidate.weight;
            selected.push(candidate);
        }

        Selection::from_candidates(selected, Self::NAME)
    }
}
