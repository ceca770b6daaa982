//! Home page featured products.
//!
//! The home page shows a random sample of the best rated in-stock products.
//! The candidate pool is a ranked id list that is cached for 5 minutes;
//! sampling happens on every request so the selection changes per visit.

use std::sync::Arc;
use std::time::Duration;

use mercadillo_core::{Product, ProductId};
use moka::future::Cache;
use rand::seq::IndexedRandom;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::{ProductRepository, RepositoryError};

/// Size of the ranked candidate pool.
pub const CANDIDATE_POOL: i64 = 100;

/// Products shown on the home page.
pub const FEATURED_COUNT: usize = 10;

/// Cache key for featured data.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    TopRated,
}

/// Featured product picker backed by a moka cache.
#[derive(Clone)]
pub struct FeaturedProducts {
    cache: Cache<CacheKey, Arc<[ProductId]>>,
}

impl Default for FeaturedProducts {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturedProducts {
    /// Create a picker with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300))
            .build();
        Self { cache }
    }

    /// Random selection of up to [`FEATURED_COUNT`] top rated products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the candidate pool or the products
    /// cannot be loaded.
    #[instrument(skip(self, pool))]
    pub async fn pick(&self, pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
        let candidates = self.candidates(pool).await?;
        let chosen = sample(&candidates, FEATURED_COUNT);
        ProductRepository::new(pool).get_many_active(&chosen).await
    }

    async fn candidates(&self, pool: &PgPool) -> Result<Arc<[ProductId]>, RepositoryError> {
        if let Some(ids) = self.cache.get(&CacheKey::TopRated).await {
            debug!(count = ids.len(), "Cache hit for featured candidates");
            return Ok(ids);
        }

        let ids: Arc<[ProductId]> = ProductRepository::new(pool)
            .top_rated_ids(CANDIDATE_POOL)
            .await?
            .into();
        self.cache.insert(CacheKey::TopRated, Arc::clone(&ids)).await;
        Ok(ids)
    }
}

/// Pick `amount` distinct ids at random, keeping pool order.
fn sample(pool: &[ProductId], amount: usize) -> Vec<ProductId> {
    let mut rng = rand::rng();
    let mut chosen: Vec<(usize, ProductId)> = pool
        .iter()
        .copied()
        .enumerate()
        .collect::<Vec<_>>()
        .choose_multiple(&mut rng, amount)
        .copied()
        .collect();
    chosen.sort_unstable_by_key(|(rank, _)| *rank);
    chosen.into_iter().map(|(_, id)| id).collect()
}
