//! Product repository for database operations.
//!
//! Listing queries are assembled with `QueryBuilder` because the keyset
//! bound and the filter set vary per request. Every listing `ORDER BY` ends
//! with `created_at DESC`, matching [`mercadillo_core::listing_order`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use mercadillo_core::{
    Boundary, CategoryFilters, Keyset, Product, ProductCategory, ProductId, ProductQuery,
    ProductStatus, SellerId, SortBy, Specification,
};

use super::{ProductStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "p.id, p.slug, p.seller_id, p.title, p.description, \
     p.price, p.original_price, p.currency_id, p.images, p.rating, p.review_count, \
     p.sold, p.stock, p.is_service, p.free_shipping, p.kyc, p.from_company, \
     p.specifications, p.status, p.created_at, p.updated_at";

/// Row shape of `storefront.product`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    seller_id: SellerId,
    title: String,
    description: String,
    price: i64,
    original_price: i64,
    currency_id: String,
    images: Vec<String>,
    rating: Decimal,
    review_count: i32,
    sold: i32,
    stock: i32,
    is_service: bool,
    free_shipping: bool,
    kyc: bool,
    from_company: bool,
    specifications: Json<Vec<Specification>>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            seller_id: r.seller_id,
            title: r.title,
            description: r.description,
            price: r.price,
            original_price: r.original_price,
            currency_id: r.currency_id,
            images: r.images,
            rating: r.rating,
            review_count: r.review_count,
            sold: r.sold,
            stock: r.stock,
            is_service: r.is_service,
            free_shipping: r.free_shipping,
            kyc: r.kyc,
            from_company: r.from_company,
            specifications: r.specifications.0,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductCategoryRow {
    product_id: ProductId,
    category_id: String,
    is_primary: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an active product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p \
             WHERE p.id = $1 AND p.status = 'active'"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// IDs of the best rated in-stock products, the pool the home page
    /// samples its featured listings from.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated_ids(&self, limit: i64) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            r"
            SELECT id
            FROM storefront.product
            WHERE status = 'active' AND stock > 0
            ORDER BY rating DESC, review_count DESC, created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Get active products by ID, in the order of `ids`.
    ///
    /// IDs that are missing or no longer active are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many_active(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} \
             FROM unnest($1::uuid[]) WITH ORDINALITY AS wanted(id, position) \
             JOIN storefront.product p ON p.id = wanted.id \
             WHERE p.status = 'active' \
             ORDER BY wanted.position"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Category memberships of the given products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories_of(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductCategory>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductCategoryRow>(
            r"
            SELECT product_id, category_id, is_primary
            FROM storefront.product_category
            WHERE product_id = ANY($1)
            ORDER BY product_id, is_primary DESC, category_id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductCategory {
                product_id: r.product_id,
                category_id: r.category_id,
                is_primary: r.is_primary,
            })
            .collect())
    }

    /// Fetch one listing page as described by `query`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_listing(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let rows = listing_query(query)
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

impl ProductStore for ProductRepository<'_> {
    async fn find_page(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        self.find_listing(query).await
    }
}

// =============================================================================
// Listing SQL
// =============================================================================

/// Build the `SELECT` for one listing page.
fn listing_query(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM storefront.product p \
         WHERE p.status = 'active' \
         AND EXISTS (SELECT 1 FROM storefront.product_category pc \
         WHERE pc.product_id = p.id AND pc.category_id = "
    ));
    qb.push_bind(query.category_id.clone());
    qb.push(")");

    push_filters(&mut qb, &query.filters);
    if let Some(keyset) = &query.keyset {
        push_keyset(&mut qb, keyset);
    }

    qb.push(" ORDER BY ");
    qb.push(order_by(query.sort_by()));
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(query.limit));
    qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filters: &CategoryFilters) {
    if let Some(min) = filters.price_min {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filters.price_max {
        qb.push(" AND p.price <= ").push_bind(max);
    }
    if let Some(stars) = filters.rating {
        qb.push(" AND p.rating >= ").push_bind(Decimal::from(stars));
    }
    push_count_filter(qb, "p.review_count", filters.reviews);
    push_count_filter(qb, "p.sold", filters.sales);
    if let Some(flag) = filters.free_shipping {
        qb.push(" AND p.free_shipping = ").push_bind(flag);
    }
}

/// `0` means "exactly none", any other value "at least".
fn push_count_filter(qb: &mut QueryBuilder<'static, Postgres>, column: &str, threshold: Option<i32>) {
    match threshold {
        Some(0) => {
            qb.push(format!(" AND {column} = 0"));
        }
        Some(n) => {
            qb.push(format!(" AND {column} >= ")).push_bind(n);
        }
        None => {}
    }
}

fn push_keyset(qb: &mut QueryBuilder<'static, Postgres>, keyset: &Keyset) {
    let ts = keyset.created_before;
    match keyset.boundary {
        Boundary::PriceAbove(b) => push_column_bound(qb, "p.price", ">", b, ts),
        Boundary::PriceBelow(b) => push_column_bound(qb, "p.price", "<", b, ts),
        Boundary::RatingBelow(b) => push_column_bound(qb, "p.rating", "<", b, ts),
        Boundary::SoldBelow(b) => push_column_bound(qb, "p.sold", "<", b, ts),
        Boundary::CreatedOnly => {
            qb.push(" AND p.created_at < ").push_bind(ts);
        }
    }
}

/// `AND (col op b OR (col = b AND created_at < ts))`
fn push_column_bound<T>(
    qb: &mut QueryBuilder<'static, Postgres>,
    column: &str,
    op: &str,
    bound: T,
    ts: DateTime<Utc>,
) where
    T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Copy + Send + 'static,
{
    qb.push(format!(" AND ({column} {op} "))
        .push_bind(bound)
        .push(format!(" OR ({column} = "))
        .push_bind(bound)
        .push(" AND p.created_at < ")
        .push_bind(ts)
        .push("))");
}

const fn order_by(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::PriceAsc => "p.price ASC, p.created_at DESC",
        SortBy::PriceDesc => "p.price DESC, p.created_at DESC",
        SortBy::Rating => "p.rating DESC, p.created_at DESC",
        SortBy::Sales => "p.sold DESC, p.created_at DESC",
        SortBy::Newest => "p.created_at DESC",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mercadillo_core::CursorData;
    use std::num::NonZeroU32;

    fn query(filters: CategoryFilters, keyset: Option<Keyset>) -> ProductQuery {
        ProductQuery::with_lookahead("A1", filters, keyset, NonZeroU32::new(12).unwrap())
    }

    fn sql(query: &ProductQuery) -> String {
        listing_query(query).sql().to_owned()
    }

    #[test]
    fn test_first_page_has_no_keyset() {
        let text = sql(&query(CategoryFilters::default(), None));
        assert!(text.contains("p.status = 'active'"));
        assert!(text.contains("pc.category_id = $1"));
        assert!(!text.contains("p.created_at <"));
        assert!(text.ends_with("ORDER BY p.created_at DESC LIMIT $2"));
    }

    #[test]
    fn test_zero_count_filters_use_equality() {
        let filters = CategoryFilters {
            reviews: Some(0),
            sales: Some(5),
            ..CategoryFilters::default()
        };
        let text = sql(&query(filters, None));
        assert!(text.contains("p.review_count = 0"));
        assert!(text.contains("p.sold >= $2"));
    }

    #[test]
    fn test_price_keyset_includes_tie_break() {
        let created_at = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let cursor = CursorData {
            timestamp: created_at,
            sort_by: SortBy::PriceAsc,
            price: Some(500),
            rating: None,
            sold: None,
        };
        let filters = CategoryFilters {
            sort_by: SortBy::PriceAsc,
            ..CategoryFilters::default()
        };
        let text = sql(&query(filters, Some(cursor.keyset())));
        assert!(text.contains("AND (p.price > $2 OR (p.price = $3 AND p.created_at < $4))"));
        assert!(text.contains("ORDER BY p.price ASC, p.created_at DESC"));
    }

    #[test]
    fn test_every_order_ends_with_created_at() {
        for sort_by in SortBy::ALL {
            assert!(order_by(sort_by).ends_with("p.created_at DESC"));
        }
    }
}
