//! Solvers for team selection
//!
//! The optimiser is written against the [`Solver`] trait, so the concrete
//! backend is swappable: the default MILP backend built on `good_lp`
//! ([`MilpSolver`]) or the dependency-free exact search
//! ([`BranchBoundSolver`]). Backends see only a [`SelectionProblem`] of plain
//! coefficients, never catalog types.

use std::time::Duration;

use good_lp::ResolutionError;
use smallvec::SmallVec;
use thiserror::Error;

pub mod branch_bound;
pub mod milp;

pub use branch_bound::BranchBoundSolver;
pub use milp::MilpSolver;

/// Binary threshold for reading a relaxed 0/1 variable back as "selected".
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Solver errors.
#[derive(Debug, Error)]
pub enum SolverError {
    /// An objective or constraint coefficient is NaN or infinite.
    #[error("objective or constraint coefficient is not finite: {value}")]
    NonFiniteCoefficient {
        /// The rejected coefficient.
        value: f64,
    },

    /// The cardinality target cannot be represented exactly as a solver
    /// coefficient.
    #[error("team size {team_size} cannot be represented exactly as a solver coefficient")]
    TeamSizeNotRepresentable {
        /// The rejected team size.
        team_size: usize,
    },

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated.
        message: &'static str,
    },

    /// Wrapped MILP resolution error. Infeasibility is not an error; it is
    /// reported through [`SolverOutcome::Infeasible`] instead.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A fully-formed 0/1 selection problem, decoupled from catalog types.
///
/// Index `i` refers to the same item everywhere: `scores[i]` is its objective
/// coefficient, `prices[i]` its cost against the budget, and `categories[i]`
/// the dense index of its category within `0..category_count`.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionProblem {
    scores: Vec<f64>,
    prices: Vec<f64>,
    categories: Vec<usize>,
    category_count: usize,
    budget: f64,
    team_size: usize,
}

impl SelectionProblem {
    /// Assemble a problem from parallel coefficient vectors.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if the vectors disagree in
    /// length or a category index is out of range, and
    /// [`SolverError::NonFiniteCoefficient`] for NaN or infinite
    /// coefficients.
    pub fn new(
        scores: Vec<f64>,
        prices: Vec<f64>,
        categories: Vec<usize>,
        category_count: usize,
        budget: f64,
        team_size: usize,
    ) -> Result<Self, SolverError> {
        if scores.len() != prices.len() || scores.len() != categories.len() {
            return Err(SolverError::InvariantViolation {
                message: "score, price and category vectors must have equal lengths",
            });
        }

        for value in scores.iter().chain(prices.iter()).chain([&budget]) {
            if !value.is_finite() {
                return Err(SolverError::NonFiniteCoefficient { value: *value });
            }
        }

        if categories.iter().any(|category| *category >= category_count) {
            return Err(SolverError::InvariantViolation {
                message: "category index out of range",
            });
        }

        Ok(SelectionProblem {
            scores,
            prices,
            categories,
            category_count,
            budget,
            team_size,
        })
    }

    /// Number of decision variables (one per item).
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the problem has no decision variables.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Objective coefficient per item.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Budget cost per item.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Dense category index per item.
    pub fn categories(&self) -> &[usize] {
        &self.categories
    }

    /// Number of distinct categories referenced by [`Self::categories`].
    pub fn category_count(&self) -> usize {
        self.category_count
    }

    /// Spending budget.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Exact number of items to select.
    pub fn team_size(&self) -> usize {
        self.team_size
    }
}

/// Per-call solver options.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolveOptions {
    /// Give up once this much wall-clock time has elapsed. How promptly a
    /// backend can honour the limit is backend-dependent; see the backend
    /// docs.
    pub time_limit: Option<Duration>,
}

/// Outcome of one solver run.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverOutcome {
    /// A proven-optimal assignment: the item indexes whose decision variable
    /// solved to 1.
    Optimal(SmallVec<[usize; 10]>),

    /// The constraint system admits no feasible assignment.
    Infeasible,

    /// The time budget ran out before optimality was proven.
    TimedOut,
}

/// Trait for solving 0/1 selection problems.
///
/// Implementations must be stateless across calls: every [`Self::solve`]
/// invocation builds its own variables and model, so one solver value can
/// serve concurrent requests over a shared problem.
pub trait Solver {
    /// Solve the given problem to proven optimality.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the backend fails. Infeasibility and
    /// exceeded time budgets are not errors; they are reported through
    /// [`SolverOutcome`].
    fn solve(
        &self,
        problem: &SelectionProblem,
        options: &SolveOptions,
    ) -> Result<SolverOutcome, SolverError>;
}
