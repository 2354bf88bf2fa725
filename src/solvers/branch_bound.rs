//! Branch-and-bound Solver
//!
//! A dependency-free exact backend: depth-first search over include/exclude
//! decisions with feasibility pruning and an admissible score bound. It
//! proves optimality just like the MILP backend, and unlike the bundled MILP
//! engines it checks its deadline during the search, so
//! [`SolveOptions::time_limit`] is honoured promptly.

use std::time::Instant;

use smallvec::SmallVec;
use tracing::debug;

use crate::solvers::{SelectionProblem, SolveOptions, Solver, SolverError, SolverOutcome};

/// Slack applied to budget comparisons so accumulated rounding never rejects
/// a selection that is exactly on budget.
const BUDGET_TOLERANCE: f64 = 1e-9;

/// Exact solver using depth-first branch-and-bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct BranchBoundSolver;

impl Solver for BranchBoundSolver {
    fn solve(
        &self,
        problem: &SelectionProblem,
        options: &SolveOptions,
    ) -> Result<SolverOutcome, SolverError> {
        let started = Instant::now();

        let deadline = options
            .time_limit
            .and_then(|limit| started.checked_add(limit));

        let mut search = Search {
            problem,
            deadline,
            suffix_bounds: suffix_score_bounds(problem.scores(), problem.team_size()),
            best_score: f64::NEG_INFINITY,
            best: None,
            chosen: SmallVec::new(),
            category_used: vec![false; problem.category_count()],
            timed_out: false,
        };

        search.dfs(0, 0, 0.0, 0.0);

        if search.timed_out {
            debug!(elapsed = ?started.elapsed(), "branch-and-bound deadline exceeded");

            return Ok(SolverOutcome::TimedOut);
        }

        debug!(
            feasible = search.best.is_some(),
            elapsed = ?started.elapsed(),
            "branch-and-bound search exhausted"
        );

        Ok(search
            .best
            .map_or(SolverOutcome::Infeasible, SolverOutcome::Optimal))
    }
}

struct Search<'a> {
    problem: &'a SelectionProblem,
    deadline: Option<Instant>,

    /// `suffix_bounds[i][k]` is the sum of the `k` largest scores among
    /// items `i..`, an admissible upper bound on what any completion can add.
    suffix_bounds: Vec<Vec<f64>>,

    best_score: f64,
    best: Option<SmallVec<[usize; 10]>>,
    chosen: SmallVec<[usize; 10]>,
    category_used: Vec<bool>,
    timed_out: bool,
}

impl Search<'_> {
    fn dfs(&mut self, index: usize, chosen_count: usize, spend: f64, score: f64) {
        if self.timed_out {
            return;
        }

        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.timed_out = true;

            return;
        }

        if chosen_count == self.problem.team_size() {
            if score > self.best_score {
                self.best_score = score;
                self.best = Some(self.chosen.clone());
            }

            return;
        }

        let needed = self.problem.team_size() - chosen_count;

        // Fewer than `needed` items remain in the suffix.
        let Some(bound) = self
            .suffix_bounds
            .get(index)
            .and_then(|sums| sums.get(needed))
        else {
            return;
        };

        // No completion of this partial selection can beat the incumbent.
        if self.best.is_some() && score + *bound <= self.best_score {
            return;
        }

        let (Some(price), Some(category), Some(item_score)) = (
            self.problem.prices().get(index).copied(),
            self.problem.categories().get(index).copied(),
            self.problem.scores().get(index).copied(),
        ) else {
            return;
        };

        // Include the item, if the category is free and the budget allows.
        if self.category_used.get(category) == Some(&false)
            && spend + price <= self.problem.budget() + BUDGET_TOLERANCE
        {
            if let Some(used) = self.category_used.get_mut(category) {
                *used = true;
            }
            self.chosen.push(index);

            self.dfs(index + 1, chosen_count + 1, spend + price, score + item_score);

            self.chosen.pop();
            if let Some(used) = self.category_used.get_mut(category) {
                *used = false;
            }
        }

        // Exclude the item.
        self.dfs(index + 1, chosen_count, spend, score);
    }
}

/// For every suffix of `scores`, the prefix sums of its descending-sorted
/// top `team_size` values: `result[i][k]` bounds the score of any `k` items
/// chosen from `scores[i..]`.
fn suffix_score_bounds(scores: &[f64], team_size: usize) -> Vec<Vec<f64>> {
    let mut bounds = Vec::with_capacity(scores.len() + 1);
    let mut top: Vec<f64> = Vec::new();

    // Built from the empty suffix backwards, then reversed.
    bounds.push(vec![0.0]);

    for score in scores.iter().rev() {
        let position = top
            .iter()
            .position(|existing| *existing < *score)
            .unwrap_or(top.len());

        top.insert(position, *score);
        top.truncate(team_size);

        let mut sums = Vec::with_capacity(top.len() + 1);
        let mut acc = 0.0;

        sums.push(0.0);

        for value in &top {
            acc += *value;
            sums.push(acc);
        }

        bounds.push(sums);
    }

    bounds.reverse();

    bounds
}
