//! Roster
//!
//! Roster is a budget-constrained team selection engine. It scores catalog
//! items by normalising rating and price within each category, then uses
//! Mixed Integer Linear Programming (MILP) to pick the highest-value team of
//! a fixed size — at most one item per category, total spend within budget.
//!
//! ```
//! use roster::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::new(vec![
//!     Item { id: 1, name: "Anchor".into(), category: "defence".into(), price: 12.0, rating: 4.6 },
//!     Item { id: 2, name: "Spark".into(), category: "attack".into(), price: 9.5, rating: 4.1 },
//! ])?;
//!
//! let request = SelectionRequest::new(30.0).with_team_size(2);
//! let selection = TeamSelector::new().select(&catalog, &request)?;
//!
//! assert_eq!(selection.items().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod prelude;
pub mod scoring;
pub mod selection;
pub mod solvers;
