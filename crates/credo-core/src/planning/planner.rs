//! Action planning: turn ranked goals into a budgeted, scheduled plan.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{Candidate, Problem, Selection, Solver};
use crate::desires::ScoredGoal;
use crate::types::GoalType;

/// Default plan budget.
pub const DEFAULT_PLAN_CAPACITY: f64 = 1.0;

/// An action a goal of some type could lead to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub id: String,
    /// Weight against the plan capacity.
    pub cost: f64,
    /// Expected benefit in `[0, 1]`, scaled by the goal's score.
    pub impact: f64,
    /// Scheduled length of the action.
    pub duration_hours: f64,
}

impl ActionTemplate {
    pub fn new(id: impl Into<String>, cost: f64, impact: f64, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            cost,
            impact,
            duration_hours,
        }
    }
}

/// Built-in templates per goal type.
pub fn default_templates() -> HashMap<GoalType, Vec<ActionTemplate>> {
    HashMap::from([
        (GoalType::Performance, vec![ActionTemplate::new("optimize_db", 0.4, 0.8, 2.0)]),
        (GoalType::Quality, vec![ActionTemplate::new("add_monitoring", 0.3, 0.7, 3.0)]),
        (GoalType::Financial, vec![ActionTemplate::new("run_scraper", 0.2, 0.6, 1.0)]),
    ])
}

/// One selected action, placed on a back-to-back schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub action_id: String,
    pub goal_id: String,
    pub cost: f64,
    pub impact: f64,
    pub start_offset_hours: f64,
    pub end_offset_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub actions: Vec<PlannedAction>,
    pub selection: Selection,
    pub total_cost: f64,
    pub total_impact: f64,
    pub total_duration_hours: f64,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Builds candidates from goal templates and solves for the budget.
pub struct ActionPlanner {
    templates: HashMap<GoalType, Vec<ActionTemplate>>,
    capacity: f64,
    solver: Arc<dyn Solver>,
}

impl ActionPlanner {
    pub fn new(solver: Arc<dyn Solver>) -> Self {
        Self {
            templates: default_templates(),
            capacity: DEFAULT_PLAN_CAPACITY,
            solver,
        }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_templates(mut self, templates: HashMap<GoalType, Vec<ActionTemplate>>) -> Self {
        self.templates = templates;
        self
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Candidates for the given goals, in goal order then template order.
    pub fn candidates(&self, goals: &[ScoredGoal]) -> Vec<Candidate> {
        goals
            .iter()
            .flat_map(|scored| {
                self.templates
                    .get(&scored.goal.goal_type)
                    .into_iter()
                    .flatten()
                    .map(move |t| Candidate::new(candidate_id(&scored.goal.id, &t.id), t.cost, t.impact * scored.score))
            })
            .collect()
    }

    pub fn plan(&self, goals: &[ScoredGoal]) -> ActionPlan {
        let lookup: HashMap<String, (&str, &ActionTemplate)> = goals
            .iter()
            .flat_map(|scored| {
                self.templates
                    .get(&scored.goal.goal_type)
                    .into_iter()
                    .flatten()
                    .map(move |t| (candidate_id(&scored.goal.id, &t.id), (scored.goal.id.as_str(), t)))
            })
            .collect();

        let problem = Problem::new(self.candidates(goals), self.capacity);
        let selection = self.solver.solve(&problem);

        let mut clock = 0.0;
        let mut actions = Vec::with_capacity(selection.selected.len());
        for candidate in &selection.selected {
            let Some((goal_id, template)) = lookup.get(&candidate.id) else {
                continue;
            };
            let start = clock;
            clock += template.duration_hours;
            actions.push(PlannedAction {
                action_id: template.id.clone(),
                goal_id: goal_id.to_string(),
                cost: template.cost,
                impact: template.impact,
                start_offset_hours: start,
                end_offset_hours: clock,
            });
        }

        let plan = ActionPlan {
            total_cost: actions.iter().map(|a| a.cost).sum(),
            total_impact: actions.iter().map(|a| a.impact).sum(),
            total_duration_hours: clock,
            actions,
            selection,
        };

        info!(
            candidates = problem.candidates.len(),
            selected = plan.actions.len(),
            total_cost = plan.total_cost,
            method = %plan.selection.method,
            "Action plan built"
        );
        plan
    }
}

fn candidate_id(goal_id: &str, action_id: &str) -> String {
    format!("{}:{}", goal_id, action_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{select_solver, ClassicalGreedy, SolverPreference};
    use crate::types::{default_goals, Goal};

    fn ranked() -> Vec<ScoredGoal> {
        default_goals().into_iter().map(ScoredGoal::new).collect()
    }

    #[test]
    fn test_candidates_follow_goal_types() {
        let planner = ActionPlanner::new(Arc::new(ClassicalGreedy));
        let candidates = planner.candidates(&ranked());
        let ids: Vec<_> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "revenue_generation:run_scraper",
                "system_efficiency:optimize_db",
                "user_satisfaction:add_monitoring",
                "cost_optimization:run_scraper",
            ]
        );
    }

    #[test]
    fn test_plan_respects_capacity_and_schedules() {
        let planner = ActionPlanner::new(Arc::new(select_solver(SolverPreference::Auto))).with_capacity(0.5);
        let plan = planner.plan(&ranked());

        assert!(plan.total_cost <= 0.5 + 1e-9);
        assert!(!plan.is_empty());
        let mut expected_start = 0.0;
        for action in &plan.actions {
            assert_eq!(action.start_offset_hours, expected_start);
            expected_start = action.end_offset_hours;
        }
        assert_eq!(plan.total_duration_hours, expected_start);
    }

    #[test]
    fn test_untemplated_goal_yields_empty_plan() {
        let planner = ActionPlanner::new(Arc::new(ClassicalGreedy));
        let goals = vec![ScoredGoal::new(Goal::new("x", "X", GoalType::from("engagement"), 1.0, 0.0))];
        let plan = planner.plan(&goals);
        assert!(plan.is_empty());
        assert_eq!(plan.total_duration_hours, 0.0);
    }
}
