//! Roster prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{Catalog, CatalogError, Item, ItemId},
    scoring::{DEFAULT_PRICE_WEIGHT, DEFAULT_RATING_WEIGHT, WeightError, Weights, value_scores},
    selection::{
        DEFAULT_TEAM_SIZE, Selection, SelectionError, SelectionRequest, TeamSelector,
        ValidationError,
    },
    solvers::{
        BranchBoundSolver, MilpSolver, SelectionProblem, SolveOptions, Solver, SolverError,
        SolverOutcome,
    },
};
