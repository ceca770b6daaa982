//! Catalog entities as the storefront sees them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, QuestionId, ReviewId, SellerId};
use super::status::ProductStatus;

/// A product listing.
///
/// Prices are whole units of `currency_id`. `rating` is the cached average of
/// approved reviews, kept at two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub seller_id: SellerId,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub original_price: i64,
    pub currency_id: String,
    pub images: Vec<String>,
    pub rating: Decimal,
    pub review_count: i32,
    pub sold: i32,
    pub stock: i32,
    pub is_service: bool,
    pub free_shipping: bool,
    pub kyc: bool,
    pub from_company: bool,
    pub specifications: Vec<Specification>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First image, used as the listing thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A name/value pair shown in the product's specification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

/// Membership of a product in a category.
///
/// A product may belong to several categories; at most one of them is
/// flagged as primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCategory {
    pub product_id: ProductId,
    pub category_id: String,
    pub is_primary: bool,
}

/// An approved buyer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub name: String,
    /// Star rating, 1 to 5.
    pub rating: i16,
    pub comment: String,
    pub helpful: i32,
    pub created_at: DateTime<Utc>,
}

/// A shopper question and its published answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub question: String,
    pub answer: String,
    pub answered_by_ia: bool,
    pub helpful: i32,
    pub created_at: DateTime<Utc>,
}
