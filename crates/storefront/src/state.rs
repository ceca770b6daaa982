//! Application state shared across handlers.

use std::sync::Arc;

use mercadillo_core::CategoryTree;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::i18n::Translations;
use crate::services::{CursorCodec, FeaturedProducts};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    categories: CategoryTree,
    translations: Translations,
    cursor_codec: CursorCodec,
    featured: FeaturedProducts,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `categories` - Category tree, loaded once at startup
    /// * `translations` - Interface translation tables
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
        categories: CategoryTree,
        translations: Translations,
    ) -> Self {
        let cursor_codec = CursorCodec::new(&config.cursor_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
                translations,
                cursor_codec,
                featured: FeaturedProducts::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the category tree.
    #[must_use]
    pub fn categories(&self) -> &CategoryTree {
        &self.inner.categories
    }

    /// Get a reference to the translation tables.
    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.inner.translations
    }

    /// Get a reference to the pagination cursor codec.
    #[must_use]
    pub fn cursor_codec(&self) -> &CursorCodec {
        &self.inner.cursor_codec
    }

    /// Get a reference to the featured product picker.
    #[must_use]
    pub fn featured(&self) -> &FeaturedProducts {
        &self.inner.featured
    }
}
