//! Keyset pagination boundaries.
//!
//! A [`CursorData`] records where the previous page ended: the `created_at`
//! of its last row plus that row's value in the active sort column. It is
//! sealed into an opaque token by the storefront before reaching a client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filters::SortBy;
use crate::types::Product;

/// Decoded pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorData {
    /// `created_at` of the last row already shown.
    pub timestamp: DateTime<Utc>,
    pub sort_by: SortBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold: Option<i32>,
}

impl CursorData {
    /// Cursor pointing just past `last` under `sort_by`.
    ///
    /// Only the column `sort_by` orders on is recorded.
    #[must_use]
    pub fn after(last: &Product, sort_by: SortBy) -> Self {
        let mut cursor = Self {
            timestamp: last.created_at,
            sort_by,
            price: None,
            rating: None,
            sold: None,
        };
        match sort_by {
            SortBy::PriceAsc | SortBy::PriceDesc => cursor.price = Some(last.price),
            SortBy::Rating => cursor.rating = Some(last.rating),
            SortBy::Sales => cursor.sold = Some(last.sold),
            SortBy::Newest => {}
        }
        cursor
    }

    /// The row predicate this cursor stands for.
    ///
    /// A sort mode whose boundary value is missing degrades to the
    /// `created_at`-only bound.
    #[must_use]
    pub fn keyset(&self) -> Keyset {
        let boundary = match (self.sort_by, self.price, self.rating, self.sold) {
            (SortBy::PriceAsc, Some(price), _, _) => Boundary::PriceAbove(price),
            (SortBy::PriceDesc, Some(price), _, _) => Boundary::PriceBelow(price),
            (SortBy::Rating, _, Some(rating), _) => Boundary::RatingBelow(rating),
            (SortBy::Sales, _, _, Some(sold)) => Boundary::SoldBelow(sold),
            _ => Boundary::CreatedOnly,
        };
        Keyset {
            created_before: self.timestamp,
            boundary,
        }
    }
}

/// Primary-column half of a keyset predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// `price > b OR (price = b AND created_at < ts)`
    PriceAbove(i64),
    /// `price < b OR (price = b AND created_at < ts)`
    PriceBelow(i64),
    /// `rating < b OR (rating = b AND created_at < ts)`
    RatingBelow(Decimal),
    /// `sold < b OR (sold = b AND created_at < ts)`
    SoldBelow(i32),
    /// `created_at < ts`
    CreatedOnly,
}

/// Rows strictly after a cursor in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyset {
    pub created_before: DateTime<Utc>,
    pub boundary: Boundary,
}

impl Keyset {
    /// Whether `product` lies after the cursor.
    #[must_use]
    pub fn admits(&self, product: &Product) -> bool {
        let older = product.created_at < self.created_before;
        match self.boundary {
            Boundary::PriceAbove(b) => product.price > b || (product.price == b && older),
            Boundary::PriceBelow(b) => product.price < b || (product.price == b && older),
            Boundary::RatingBelow(b) => product.rating < b || (product.rating == b && older),
            Boundary::SoldBelow(b) => product.sold < b || (product.sold == b && older),
            Boundary::CreatedOnly => older,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{ProductId, ProductStatus, SellerId};
    use chrono::TimeZone;

    fn product(price: i64, rating: Decimal, sold: i32, minute: u32) -> Product {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap();
        Product {
            id: ProductId::generate(),
            slug: format!("p-{minute}"),
            seller_id: SellerId::generate(),
            title: "Lámpara".to_owned(),
            description: String::new(),
            price,
            original_price: 0,
            currency_id: "USD".to_owned(),
            images: Vec::new(),
            rating,
            review_count: 0,
            sold,
            stock: 1,
            is_service: false,
            free_shipping: false,
            kyc: false,
            from_company: false,
            specifications: Vec::new(),
            status: ProductStatus::Active,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_after_records_only_sort_column() {
        let last = product(1500, Decimal::new(45, 1), 9, 10);

        let by_price = CursorData::after(&last, SortBy::PriceAsc);
        assert_eq!(by_price.price, Some(1500));
        assert_eq!((by_price.rating, by_price.sold), (None, None));

        let by_rating = CursorData::after(&last, SortBy::Rating);
        assert_eq!(by_rating.rating, Some(Decimal::new(45, 1)));
        assert_eq!((by_rating.price, by_rating.sold), (None, None));

        let by_sales = CursorData::after(&last, SortBy::Sales);
        assert_eq!(by_sales.sold, Some(9));

        let newest = CursorData::after(&last, SortBy::Newest);
        assert_eq!(newest.timestamp, last.created_at);
        assert_eq!((newest.price, newest.rating, newest.sold), (None, None, None));
    }

    #[test]
    fn test_missing_boundary_degrades_to_created_only() {
        let last = product(100, Decimal::ZERO, 0, 0);
        let mut cursor = CursorData::after(&last, SortBy::PriceDesc);
        cursor.price = None;
        assert_eq!(cursor.keyset().boundary, Boundary::CreatedOnly);
    }

    #[test]
    fn test_price_above_breaks_ties_on_created_at() {
        let last = product(100, Decimal::ZERO, 0, 30);
        let keyset = CursorData::after(&last, SortBy::PriceAsc).keyset();

        assert!(keyset.admits(&product(101, Decimal::ZERO, 0, 59)));
        assert!(keyset.admits(&product(100, Decimal::ZERO, 0, 29)));
        assert!(!keyset.admits(&product(100, Decimal::ZERO, 0, 30)));
        assert!(!keyset.admits(&product(100, Decimal::ZERO, 0, 31)));
        assert!(!keyset.admits(&product(99, Decimal::ZERO, 0, 0)));
    }

    #[test]
    fn test_rating_below() {
        let last = product(100, Decimal::new(40, 1), 0, 30);
        let keyset = CursorData::after(&last, SortBy::Rating).keyset();

        assert!(keyset.admits(&product(100, Decimal::new(39, 1), 0, 59)));
        assert!(keyset.admits(&product(100, Decimal::new(400, 2), 0, 10)));
        assert!(!keyset.admits(&product(100, Decimal::new(41, 1), 0, 0)));
    }

    #[test]
    fn test_serialized_shape() {
        let last = product(2500, Decimal::ZERO, 3, 5);
        let json = serde_json::to_value(CursorData::after(&last, SortBy::PriceDesc)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["sortBy"], "price_desc");
        assert_eq!(object["price"], 2500);
        assert!(object.contains_key("timestamp"));
        assert!(!object.contains_key("rating"));
        assert!(!object.contains_key("sold"));
    }
}
