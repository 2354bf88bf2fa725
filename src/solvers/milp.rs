//! MILP Solver
//!
//! Default backend built on `good_lp`. The concrete MILP engine is chosen at
//! compile time: `microlp` (bundled, default) or HiGHS via the
//! `solver-highs` feature.
//!
//! The bundled engines cannot be interrupted mid-solve, so
//! [`SolveOptions::time_limit`] is not honoured here; use
//! [`BranchBoundSolver`](crate::solvers::BranchBoundSolver) when a hard
//! deadline matters.

use std::time::Instant;

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use num_traits::ToPrimitive;
use smallvec::SmallVec;
use tracing::debug;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::solvers::{
    BINARY_THRESHOLD, SelectionProblem, SolveOptions, Solver, SolverError, SolverOutcome,
};

/// Solver using Mixed Integer Linear Programming (MILP)
#[derive(Clone, Copy, Debug, Default)]
pub struct MilpSolver;

impl Solver for MilpSolver {
    fn solve(
        &self,
        problem: &SelectionProblem,
        _options: &SolveOptions,
    ) -> Result<SolverOutcome, SolverError> {
        // No variables means no assignment can reach a positive cardinality
        // target; the formulation below would be degenerate, so short-circuit.
        if problem.is_empty() {
            return Ok(SolverOutcome::Infeasible);
        }

        let started = Instant::now();

        // One fresh binary decision variable per item, per call. Solver state
        // is never shared or reused across calls.
        let mut pb = ProblemVariables::new();

        let x: Vec<Variable> = problem
            .scores()
            .iter()
            .map(|_| pb.add(variable().binary()))
            .collect();

        // Objective: maximise the total value score of the selection.
        let mut objective = Expression::default();

        for (var, score) in x.iter().zip(problem.scores()) {
            objective += *var * *score;
        }

        let mut model = pb.maximise(objective).using(default_solver);

        // Budget constraint: total spend stays within the caller's budget.
        let mut spend = Expression::default();

        for (var, price) in x.iter().zip(problem.prices()) {
            spend += *var * *price;
        }

        model = model.with(constraint::leq(spend, problem.budget()));

        // Category constraint: at most one selection per category.
        let mut per_category: Vec<Expression> = (0..problem.category_count())
            .map(|_| Expression::default())
            .collect();

        for (var, category) in x.iter().zip(problem.categories()) {
            if let Some(picks) = per_category.get_mut(*category) {
                *picks += *var;
            }
        }

        for picks in per_category {
            model = model.with(constraint::leq(picks, 1));
        }

        // Cardinality constraint: select exactly `team_size` items.
        let mut picked = Expression::default();

        for var in &x {
            picked += *var;
        }

        let team_size = usize_to_f64_exact(problem.team_size()).ok_or(
            SolverError::TeamSizeNotRepresentable {
                team_size: problem.team_size(),
            },
        )?;

        model = model.with(constraint::eq(picked, team_size));

        match model.solve() {
            Ok(solution) => {
                // The variables are binary; values come back as floats, so
                // treat anything above 0.5 as selected to tolerate numerical
                // noise.
                let selected: SmallVec<[usize; 10]> = x
                    .iter()
                    .enumerate()
                    .filter(|(_, var)| solution.value(**var) > BINARY_THRESHOLD)
                    .map(|(index, _)| index)
                    .collect();

                debug!(
                    selected = selected.len(),
                    elapsed = ?started.elapsed(),
                    "milp solve reached optimality"
                );

                Ok(SolverOutcome::Optimal(selected))
            }
            Err(ResolutionError::Infeasible) => {
                debug!(elapsed = ?started.elapsed(), "milp problem is infeasible");

                Ok(SolverOutcome::Infeasible)
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Convert a `usize` to an `f64` if it can be represented exactly.
fn usize_to_f64_exact(v: usize) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_usize() == Some(v)).then_some(f)
}
