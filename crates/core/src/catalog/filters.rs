//! Listing sort modes and shopper-supplied filters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Sort order of a category listing.
///
/// Every mode breaks ties on `created_at` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    Rating,
    /// Best selling first.
    Sales,
    /// Most recently listed first.
    #[default]
    Newest,
}

impl SortBy {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Rating,
        Self::Sales,
    ];

    /// Parse a `sort` query value.
    ///
    /// Anything unrecognized, including the empty string, means [`SortBy::Newest`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "sales" => Self::Sales,
            _ => Self::Newest,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
            Self::Sales => "sales",
            Self::Newest => "newest",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-scoped listing filters. `None` means "don't filter".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryFilters {
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    /// Minimum average rating, in whole stars.
    pub rating: Option<i32>,
    /// Review count threshold; see [`count_matches`].
    pub reviews: Option<i32>,
    /// Units sold threshold; see [`count_matches`].
    pub sales: Option<i32>,
    pub free_shipping: Option<bool>,
    pub sort_by: SortBy,
}

impl CategoryFilters {
    /// Whether `product` passes every filter.
    ///
    /// Status and category membership are not checked here.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.price_min.is_none_or(|min| product.price >= min)
            && self.price_max.is_none_or(|max| product.price <= max)
            && self
                .rating
                .is_none_or(|min| product.rating >= Decimal::from(min))
            && self
                .reviews
                .is_none_or(|n| count_matches(n, product.review_count))
            && self.sales.is_none_or(|n| count_matches(n, product.sold))
            && self
                .free_shipping
                .is_none_or(|flag| product.free_shipping == flag)
    }

    /// Whether any filter besides the sort order is set.
    #[must_use]
    pub const fn is_filtering(&self) -> bool {
        self.price_min.is_some()
            || self.price_max.is_some()
            || self.rating.is_some()
            || self.reviews.is_some()
            || self.sales.is_some()
            || self.free_shipping.is_some()
    }
}

/// Count thresholds treat `0` as "exactly none" and `n > 0` as "at least n".
#[must_use]
pub const fn count_matches(threshold: i32, value: i32) -> bool {
    if threshold == 0 {
        value == 0
    } else {
        value >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_known_values() {
        for sort in SortBy::ALL {
            assert_eq!(SortBy::parse_lenient(sort.as_str()), sort);
        }
    }

    #[test]
    fn test_parse_lenient_falls_back_to_newest() {
        assert_eq!(SortBy::parse_lenient(""), SortBy::Newest);
        assert_eq!(SortBy::parse_lenient("PRICE_ASC"), SortBy::Newest);
        assert_eq!(SortBy::parse_lenient("cheapest"), SortBy::Newest);
    }

    #[test]
    fn test_zero_threshold_means_exactly_zero() {
        assert!(count_matches(0, 0));
        assert!(!count_matches(0, 1));
        assert!(!count_matches(0, 40));
    }

    #[test]
    fn test_positive_threshold_means_at_least() {
        assert!(!count_matches(1, 0));
        assert!(count_matches(1, 1));
        assert!(count_matches(1, 7));
        assert!(!count_matches(3, 2));
    }

    #[test]
    fn test_default_filters_do_not_filter() {
        let filters = CategoryFilters::default();
        assert!(!filters.is_filtering());
        assert_eq!(filters.sort_by, SortBy::Newest);
    }
}
