//! Catalog browsing: the category tree and keyset-paginated listings.

pub mod category;
pub mod cursor;
pub mod filters;
pub mod query;

pub use category::{Category, CategoryError, CategoryFlat, CategoryTree, MAX_DEPTH};
pub use cursor::{Boundary, CursorData, Keyset};
pub use filters::{CategoryFilters, SortBy, count_matches};
pub use query::{ProductQuery, listing_order};
