//! Team Selection
//!
//! Orchestrates one selection request end to end: validate the request,
//! score the catalog, formulate the 0/1 program, solve it, and extract the
//! chosen items. Infeasibility and timeouts are structured outcomes rather
//! than errors — the request was well-formed, the constraint system just had
//! no answer (or was not given long enough to prove one) — so callers can
//! tell "nothing fits" apart from "nothing was asked for".

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, Item, ItemId},
    scoring::{Weights, value_scores},
    solvers::{
        MilpSolver, SelectionProblem, SolveOptions, Solver, SolverError, SolverOutcome,
    },
};

/// Default number of items on a team.
pub const DEFAULT_TEAM_SIZE: usize = 5;

/// Validation errors for a selection request.
///
/// All of these are detectable before invoking the solver and are rejected
/// at the boundary.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The budget is missing its meaning: zero, negative, NaN or infinite.
    #[error("budget must be a positive finite number, got {0}")]
    NonPositiveBudget(f64),

    /// A team of zero items is never a useful request.
    #[error("team size must be at least 1")]
    ZeroTeamSize,

    /// The per-category limit makes the cardinality target unreachable: with
    /// fewer distinct categories than team slots the program is infeasible
    /// by construction, so reject it up front instead of reporting a silent
    /// infeasibility.
    #[error("team size {team_size} exceeds the {categories} distinct categories in the catalog")]
    TeamSizeExceedsCategories {
        /// The requested team size.
        team_size: usize,
        /// Distinct categories available in the catalog.
        categories: usize,
    },
}

/// A selection request: how much to spend and how many items to pick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    budget: f64,

    #[serde(default = "default_team_size")]
    team_size: usize,
}

fn default_team_size() -> usize {
    DEFAULT_TEAM_SIZE
}

impl SelectionRequest {
    /// Request a team of [`DEFAULT_TEAM_SIZE`] items within `budget`.
    pub fn new(budget: f64) -> Self {
        SelectionRequest {
            budget,
            team_size: DEFAULT_TEAM_SIZE,
        }
    }

    /// Override the team size.
    #[must_use]
    pub fn with_team_size(mut self, team_size: usize) -> Self {
        self.team_size = team_size;

        self
    }

    /// The spending budget.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// The exact number of items to select.
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Validate the request against a catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a non-positive budget, a zero team
    /// size, or a team size exceeding the catalog's distinct categories.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ValidationError> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(ValidationError::NonPositiveBudget(self.budget));
        }

        if self.team_size == 0 {
            return Err(ValidationError::ZeroTeamSize);
        }

        if self.team_size > catalog.distinct_categories() {
            return Err(ValidationError::TeamSizeExceedsCategories {
                team_size: self.team_size,
                categories: catalog.distinct_categories(),
            });
        }

        Ok(())
    }
}

/// Outcome of a selection request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Selection {
    /// A proven-optimal team of exactly the requested size. Order carries no
    /// meaning.
    Team {
        /// The selected items.
        items: Vec<Item>,
    },

    /// No assignment satisfies budget, category uniqueness and cardinality
    /// simultaneously.
    Infeasible,

    /// The solver exhausted its time budget before proving optimality.
    TimedOut,
}

impl Selection {
    /// The selected items, or an empty slice for infeasible and timed-out
    /// outcomes.
    pub fn items(&self) -> &[Item] {
        match self {
            Selection::Team { items } => items,
            Selection::Infeasible | Selection::TimedOut => &[],
        }
    }

    /// Whether a team was found.
    pub fn is_team(&self) -> bool {
        matches!(self, Selection::Team { .. })
    }
}

/// Errors from team selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The request failed validation and never reached the solver.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The solver backend failed.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// No value score was computed for a catalog item (this is a bug).
    #[error("no value score computed for item {0}")]
    MissingScore(ItemId),

    /// The solver reported an index outside the catalog (this is a bug).
    #[error("solver selected unknown item index {0}")]
    UnknownItemIndex(usize),
}

/// Selects teams from a catalog snapshot.
///
/// Holds configuration only — weights, solve options, the backend — never
/// per-request state. Every [`Self::select`] call formulates a fresh problem
/// and fresh solver variables, so a single selector can serve concurrent
/// requests over a shared snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct TeamSelector<S: Solver = MilpSolver> {
    solver: S,
    weights: Weights,
    options: SolveOptions,
}

impl TeamSelector<MilpSolver> {
    /// Selector with the default MILP backend and default weights.
    pub fn new() -> Self {
        TeamSelector::default()
    }
}

impl<S: Solver> TeamSelector<S> {
    /// Selector with a specific solver backend.
    pub fn with_solver(solver: S) -> Self {
        TeamSelector {
            solver,
            weights: Weights::default(),
            options: SolveOptions::default(),
        }
    }

    /// Override the scoring weights.
    #[must_use]
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;

        self
    }

    /// Bound the wall-clock time of each solve.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.options.time_limit = Some(limit);

        self
    }

    /// Select the optimal team for `request` from `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Validation`] for a malformed request and
    /// [`SelectionError::Solver`] if the backend fails. Infeasibility and
    /// timeouts are reported through [`Selection`], not as errors.
    pub fn select(
        &self,
        catalog: &Catalog,
        request: &SelectionRequest,
    ) -> Result<Selection, SelectionError> {
        request.validate(catalog)?;

        let scores = value_scores(catalog, self.weights);
        let problem = formulate(catalog, &scores, request)?;

        match self.solver.solve(&problem, &self.options)? {
            SolverOutcome::Optimal(indexes) => {
                let mut items = Vec::with_capacity(indexes.len());

                for index in indexes {
                    let item = catalog
                        .items()
                        .get(index)
                        .ok_or(SelectionError::UnknownItemIndex(index))?;

                    items.push(item.clone());
                }

                debug!(team = items.len(), budget = request.budget(), "team selected");

                Ok(Selection::Team { items })
            }
            SolverOutcome::Infeasible => {
                debug!(budget = request.budget(), "selection infeasible");

                Ok(Selection::Infeasible)
            }
            SolverOutcome::TimedOut => {
                debug!(budget = request.budget(), "selection timed out");

                Ok(Selection::TimedOut)
            }
        }
    }
}

/// Build the 0/1 program: value scores as objective coefficients, prices
/// against the budget, and a dense category index for the uniqueness
/// constraints.
fn formulate(
    catalog: &Catalog,
    scores: &FxHashMap<ItemId, f64>,
    request: &SelectionRequest,
) -> Result<SelectionProblem, SelectionError> {
    let items = catalog.items();

    let mut category_indexes: FxHashMap<&str, usize> = FxHashMap::default();
    let mut score_coefficients = Vec::with_capacity(items.len());
    let mut prices = Vec::with_capacity(items.len());
    let mut categories = Vec::with_capacity(items.len());

    for item in items {
        let next = category_indexes.len();
        let category = *category_indexes
            .entry(item.category.as_str())
            .or_insert(next);

        categories.push(category);
        prices.push(item.price);
        score_coefficients.push(
            scores
                .get(&item.id)
                .copied()
                .ok_or(SelectionError::MissingScore(item.id))?,
        );
    }

    let category_count = category_indexes.len();

    Ok(SelectionProblem::new(
        score_coefficients,
        prices,
        categories,
        category_count,
        request.budget(),
        request.team_size(),
    )?)
}
