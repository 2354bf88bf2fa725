//! Catalog
//!
//! The immutable item snapshot the whole engine operates on. A [`Catalog`] is
//! validated once at construction; after that every field is known-good, so
//! the scoring and selection code never has to re-check it.

use std::{fs::File, io::BufReader, path::Path};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a catalog item, unique across a catalog.
pub type ItemId = u64;

/// Errors raised while loading or validating a catalog snapshot.
///
/// All of these are fatal at load time: a process should refuse to serve
/// requests from a snapshot that failed validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog contains no items.
    #[error("catalog contains no items")]
    Empty,

    /// Two items share the same id.
    #[error("duplicate item id {0} in catalog")]
    DuplicateId(ItemId),

    /// An item's price is not a strictly positive finite number.
    #[error("item {id} has invalid price {price}; prices must be finite and > 0")]
    InvalidPrice {
        /// Id of the offending item.
        id: ItemId,
        /// The rejected price.
        price: f64,
    },

    /// An item's rating is not a finite number.
    #[error("item {id} has a non-finite rating")]
    NonFiniteRating {
        /// Id of the offending item.
        id: ItemId,
    },

    /// An item's category is the empty string.
    #[error("item {id} has an empty category")]
    EmptyCategory {
        /// Id of the offending item.
        id: ItemId,
    },

    /// The catalog file could not be read.
    #[error("failed to read catalog file")]
    Io(#[from] std::io::Error),

    /// The catalog JSON could not be parsed into item records.
    #[error("failed to parse catalog JSON")]
    Parse(#[from] serde_json::Error),
}

/// A catalog entry: something that can be drafted onto a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id across the catalog.
    pub id: ItemId,

    /// Display name.
    pub name: String,

    /// Category this item belongs to. Many items may share a category; a
    /// team takes at most one item from each.
    pub category: String,

    /// Price, strictly positive.
    pub price: f64,

    /// Rating, typically within `[0, 5]` but not required to be.
    pub rating: f64,
}

/// An immutable, validated snapshot of the item catalog.
///
/// Constructed once at startup and shared by reference across requests.
/// There is no write path, so concurrent readers need no locking.
#[derive(Clone, Debug)]
pub struct Catalog {
    items: Vec<Item>,
    distinct_categories: usize,
}

impl Catalog {
    /// Build a validated snapshot from raw item records.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the catalog is empty, an id repeats, a
    /// price is not finite and positive, a rating is not finite, or a
    /// category is empty.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = FxHashSet::default();
        let mut categories = FxHashSet::default();

        for item in &items {
            if !ids.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }

            // Positive prices keep the log price penalty defined downstream.
            if !item.price.is_finite() || item.price <= 0.0 {
                return Err(CatalogError::InvalidPrice {
                    id: item.id,
                    price: item.price,
                });
            }

            if !item.rating.is_finite() {
                return Err(CatalogError::NonFiniteRating { id: item.id });
            }

            if item.category.is_empty() {
                return Err(CatalogError::EmptyCategory { id: item.id });
            }

            categories.insert(item.category.as_str());
        }

        let distinct_categories = categories.len();

        Ok(Catalog {
            items,
            distinct_categories,
        })
    }

    /// Load a snapshot from a reader yielding a JSON array of item records.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the JSON cannot be parsed or the parsed
    /// records fail validation.
    pub fn from_json_reader(reader: impl std::io::Read) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_reader(reader)?;

        Self::new(items)
    }

    /// Load a snapshot from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be opened, parsed, or
    /// validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;

        Self::from_json_reader(BufReader::new(file))
    }

    /// The items in the snapshot, in load order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items in the snapshot. Always at least 1.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// A validated catalog is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of distinct category values across the snapshot.
    pub fn distinct_categories(&self) -> usize {
        self.distinct_categories
    }
}
