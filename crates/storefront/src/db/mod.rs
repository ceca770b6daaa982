//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `product` - Listings, with cached rating/review/sales counters
//! - `product_category` - Product to category membership, one row may be primary
//! - `review` - Buyer reviews (only `approved` ones are shown)
//! - `question` - Shopper questions (only `answered` ones are shown)
//! - `warehouse` - Seller warehouses
//! - `product_warehouse` - Units and unit weight of a product held in a warehouse
//! - `shipping_cost` - Shipping rates offered from one `product_warehouse` row
//!
//! Categories are not stored in the database; `category_id` refers to the
//! ids of the category tree document.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p mercadillo-cli -- migrate
//! ```

pub mod feedback;
pub mod products;
pub mod warehouses;

use std::future::Future;
use std::time::Duration;

use mercadillo_core::{Product, ProductQuery};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use feedback::FeedbackRepository;
pub use products::ProductRepository;
pub use warehouses::WarehouseRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Source of category listing pages.
///
/// Implementations must honour every part of the [`ProductQuery`]: listed
/// status, category membership, filters, keyset bound, listing order and
/// row limit.
pub trait ProductStore: Send + Sync {
    /// Fetch the rows of one page, lookahead row included.
    fn find_page(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
