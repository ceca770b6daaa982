//! Category listing query description.
//!
//! [`ProductQuery`] is the storage-agnostic form of one page fetch. The SQL
//! repository translates it into a `WHERE`/`ORDER BY`/`LIMIT` clause; the
//! in-memory helpers here evaluate the same semantics directly, so both
//! sides can be checked against each other.

use std::cmp::Ordering;
use std::num::NonZeroU32;

use super::cursor::Keyset;
use super::filters::{CategoryFilters, SortBy};
use crate::types::Product;

/// One page fetch against a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: String,
    pub filters: CategoryFilters,
    /// Rows must lie after this bound; `None` starts from the first row.
    pub keyset: Option<Keyset>,
    /// Maximum rows returned, lookahead row included.
    pub limit: u32,
}

impl ProductQuery {
    /// Query for a page of `page_size` rows plus one lookahead row.
    #[must_use]
    pub fn with_lookahead(
        category_id: impl Into<String>,
        filters: CategoryFilters,
        keyset: Option<Keyset>,
        page_size: NonZeroU32,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            filters,
            keyset,
            limit: page_size.get().saturating_add(1),
        }
    }

    #[must_use]
    pub const fn sort_by(&self) -> SortBy {
        self.filters.sort_by
    }

    /// Whether `product` belongs in the result, category membership aside.
    #[must_use]
    pub fn admits(&self, product: &Product) -> bool {
        product.status.is_listed()
            && self.filters.matches(product)
            && self.keyset.as_ref().is_none_or(|k| k.admits(product))
    }

    /// Listing order: the sort column, then `created_at` descending.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        listing_order(self.sort_by(), a, b)
    }
}

/// Total order of a listing under `sort_by`.
#[must_use]
pub fn listing_order(sort_by: SortBy, a: &Product, b: &Product) -> Ordering {
    let primary = match sort_by {
        SortBy::PriceAsc => a.price.cmp(&b.price),
        SortBy::PriceDesc => b.price.cmp(&a.price),
        SortBy::Rating => b.rating.cmp(&a.rating),
        SortBy::Sales => b.sold.cmp(&a.sold),
        SortBy::Newest => Ordering::Equal,
    };
    primary.then_with(|| b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::cursor::CursorData;
    use crate::types::{ProductId, ProductStatus, SellerId};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn product(price: i64, minutes: i64) -> Product {
        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        Product {
            id: ProductId::generate(),
            slug: format!("item-{minutes}"),
            seller_id: SellerId::generate(),
            title: format!("Item {minutes}"),
            description: String::new(),
            price,
            original_price: price,
            currency_id: "USD".to_owned(),
            images: Vec::new(),
            rating: Decimal::new(35, 1),
            review_count: 2,
            sold: 1,
            stock: 4,
            is_service: false,
            free_shipping: true,
            kyc: false,
            from_company: false,
            specifications: Vec::new(),
            status: ProductStatus::Active,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_lookahead_adds_one_row() {
        let query = ProductQuery::with_lookahead(
            "A1",
            CategoryFilters::default(),
            None,
            NonZeroU32::new(12).unwrap(),
        );
        assert_eq!(query.limit, 13);

        let saturated = ProductQuery::with_lookahead(
            "A1",
            CategoryFilters::default(),
            None,
            NonZeroU32::MAX,
        );
        assert_eq!(saturated.limit, u32::MAX);
    }

    #[test]
    fn test_inactive_products_are_excluded() {
        let query = ProductQuery::with_lookahead(
            "A1",
            CategoryFilters::default(),
            None,
            NonZeroU32::MIN,
        );
        let mut paused = product(10, 1);
        paused.status = ProductStatus::Pause;
        assert!(query.admits(&product(10, 1)));
        assert!(!query.admits(&paused));
    }

    #[test]
    fn test_equal_prices_order_newest_first() {
        let older = product(50, 1);
        let newer = product(50, 2);
        assert_eq!(listing_order(SortBy::PriceAsc, &newer, &older), Ordering::Less);
        assert_eq!(listing_order(SortBy::PriceDesc, &newer, &older), Ordering::Less);
        assert_eq!(listing_order(SortBy::Newest, &older, &newer), Ordering::Greater);
    }

    #[test]
    fn test_keyset_and_filters_both_apply() {
        let filters = CategoryFilters {
            price_max: Some(100),
            sort_by: SortBy::PriceAsc,
            ..CategoryFilters::default()
        };
        let keyset = CursorData::after(&product(40, 5), SortBy::PriceAsc).keyset();
        let query = ProductQuery::with_lookahead("A1", filters, Some(keyset), NonZeroU32::MIN);

        assert!(query.admits(&product(60, 9)));
        assert!(!query.admits(&product(30, 9)));
        assert!(!query.admits(&product(150, 9)));
    }

    fn sort_strategy() -> impl Strategy<Value = SortBy> {
        prop::sample::select(SortBy::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// The keyset predicate admits exactly the rows ordered after the cursor row.
        #[test]
        fn prop_keyset_matches_listing_order(
            sort_by in sort_strategy(),
            rows in prop::collection::vec((0i64..5, 0i64..5, 0i32..5), 2..20),
            pivot in any::<prop::sample::Index>(),
        ) {
            let products: Vec<Product> = rows
                .iter()
                .enumerate()
                .map(|(i, &(price, rating, sold))| {
                    let mut p = product(price, i64::try_from(i).unwrap());
                    p.rating = Decimal::from(rating);
                    p.sold = sold;
                    p
                })
                .collect();
            let last = pivot.get(&products);
            let keyset = CursorData::after(last, sort_by).keyset();

            for candidate in &products {
                let after = listing_order(sort_by, last, candidate) == Ordering::Less;
                prop_assert_eq!(keyset.admits(candidate), after);
            }
        }
    }
}
