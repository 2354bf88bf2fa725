//! Value Scoring
//!
//! Scores every catalog item relative to its own category. Absolute rating
//! and price scales differ wildly between categories, so both dimensions are
//! min-max normalised within the category before being combined:
//!
//! ```text
//! score = w_r * norm_rating - w_p * ln(norm_price + 1)
//! ```
//!
//! The linear rating term keeps quality differences proportionally weighted
//! while the logarithmic price penalty compresses the effect of expensive
//! items without ever becoming unbounded (`norm_price` lies in `[0, 1]`, so
//! the penalty ranges over `[0, ln 2]`).

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::catalog::{Catalog, Item, ItemId};

/// Default weight on the normalised rating term.
pub const DEFAULT_RATING_WEIGHT: f64 = 0.7;

/// Default weight on the logarithmic price penalty.
pub const DEFAULT_PRICE_WEIGHT: f64 = 0.3;

/// Errors raised while constructing scoring weights.
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    /// A weight was negative, NaN or infinite.
    #[error("weights must be non-negative finite numbers, got rating {rating} and price {price}")]
    Invalid {
        /// The rejected rating weight.
        rating: f64,
        /// The rejected price weight.
        price: f64,
    },
}

/// Weights combining the rating term and the price penalty.
///
/// Not required to sum to 1; any non-negative finite pair is accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    rating: f64,
    price: f64,
}

impl Weights {
    /// Create a weight pair.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::Invalid`] if either weight is negative, NaN or
    /// infinite.
    pub fn new(rating: f64, price: f64) -> Result<Self, WeightError> {
        if !rating.is_finite() || !price.is_finite() || rating < 0.0 || price < 0.0 {
            return Err(WeightError::Invalid { rating, price });
        }

        Ok(Weights { rating, price })
    }

    /// Weight applied to the normalised rating.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Weight applied to the logarithmic price penalty.
    pub fn price(&self) -> f64 {
        self.price
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            rating: DEFAULT_RATING_WEIGHT,
            price: DEFAULT_PRICE_WEIGHT,
        }
    }
}

/// Compute the value score of every item in the catalog.
///
/// Pure and deterministic: the same snapshot and weights always produce the
/// same mapping. Scores may be negative.
///
/// Within a category where every rating (or every price) is equal, that
/// dimension normalises to 1.0 for every member: there is no information to
/// discriminate on, so nothing is penalised and no division by zero occurs.
pub fn value_scores(catalog: &Catalog, weights: Weights) -> FxHashMap<ItemId, f64> {
    let mut groups: FxHashMap<&str, Vec<&Item>> = FxHashMap::default();

    for item in catalog.items() {
        groups.entry(item.category.as_str()).or_default().push(item);
    }

    let mut scores =
        FxHashMap::with_capacity_and_hasher(catalog.len(), rustc_hash::FxBuildHasher);

    for members in groups.values() {
        let (min_rating, max_rating) = extremes(members.iter().map(|item| item.rating));
        let (min_price, max_price) = extremes(members.iter().map(|item| item.price));

        for item in members {
            let norm_rating = normalise(item.rating, min_rating, max_rating);
            let norm_price = normalise(item.price, min_price, max_price);

            let score =
                weights.rating() * norm_rating - weights.price() * (norm_price + 1.0).ln();

            scores.insert(item.id, score);
        }
    }

    scores
}

/// Minimum and maximum of a non-empty sequence of finite values.
fn extremes(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    })
}

/// Min-max normalise `value` within `[min, max]`, or 1.0 for a degenerate
/// range.
fn normalise(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        1.0
    }
}
