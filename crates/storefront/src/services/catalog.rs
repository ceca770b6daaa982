//! Category tree loading and cursor-paginated category listings.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use mercadillo_core::{CategoryError, CategoryFilters, CategoryTree, CursorData, Product, ProductQuery};
use thiserror::Error;
use tracing::{info, warn};

use super::cursor::CursorCodec;
use crate::db::{ProductStore, RepositoryError};

/// Error loading the category document at startup.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid category document {path}: {source}")]
    Category {
        path: PathBuf,
        source: CategoryError,
    },
}

/// Read and index the category document.
///
/// Called once from `main`; the returned tree is shared read-only.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the file cannot be read or is not a valid
/// category document.
pub async fn load_categories(path: &Path) -> Result<CategoryTree, CatalogLoadError> {
    let document = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogLoadError::Io {
            path: path.to_owned(),
            source,
        })?;

    let tree = CategoryTree::from_json(&document).map_err(|source| CatalogLoadError::Category {
        path: path.to_owned(),
        source,
    })?;

    info!(
        path = %path.display(),
        categories = tree.len(),
        roots = tree.roots().len(),
        "Category tree loaded"
    );
    Ok(tree)
}

/// One page of a category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorPage {
    pub products: Vec<Product>,
    /// Token for the following page; empty when there is none.
    pub next_cursor: String,
    pub has_more: bool,
}

/// Fetch one page of active products in `category_id`.
///
/// A cursor that fails to open, or that was issued for another sort order,
/// is ignored and the first page is returned. When the next cursor cannot
/// be sealed the page is still returned, with an empty cursor.
///
/// # Errors
///
/// Returns `RepositoryError` if the store query fails.
pub async fn products_by_category_cursor<S: ProductStore>(
    store: &S,
    codec: &CursorCodec,
    category_id: &str,
    cursor: Option<&str>,
    page_size: NonZeroU32,
    filters: CategoryFilters,
) -> Result<CursorPage, RepositoryError> {
    let sort_by = filters.sort_by;
    let keyset = cursor
        .filter(|token| !token.is_empty())
        .and_then(|token| match codec.decrypt(token) {
            Ok(data) if data.sort_by == sort_by => Some(data.keyset()),
            Ok(data) => {
                warn!(
                    cursor_sort = %data.sort_by,
                    request_sort = %sort_by,
                    "Cursor sort order does not match request, restarting listing"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cursor");
                None
            }
        });

    let query = ProductQuery::with_lookahead(category_id, filters, keyset, page_size);
    let mut products = store.find_page(&query).await?;

    let page_len = usize::try_from(page_size.get()).unwrap_or(usize::MAX);
    let has_more = products.len() > page_len;
    products.truncate(page_len);

    let next_cursor = match products.last() {
        Some(last) if has_more => codec
            .encrypt(&CursorData::after(last, sort_by))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to seal next cursor");
                String::new()
            }),
        _ => String::new(),
    };

    Ok(CursorPage {
        products,
        next_cursor,
        has_more,
    })
}
