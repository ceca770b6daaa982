//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Category tree loading and cursor-paginated listings
//! - `cursor` - Sealed pagination cursors
//! - `enrichment` - Display-ready product views
//! - `featured` - Cached home page selection

pub mod catalog;
pub mod cursor;
pub mod enrichment;
pub mod featured;

pub use catalog::{CatalogLoadError, CursorPage, load_categories, products_by_category_cursor};
pub use cursor::{CursorCodec, CursorError};
pub use enrichment::{EnrichedProduct, ShippingOption, Star, enrich, enrich_all};
pub use featured::FeaturedProducts;
