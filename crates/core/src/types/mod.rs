//! Core types for Mercadillo Global.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod pricing;
pub mod product;
pub mod status;
pub mod warehouse;

pub use id::*;
pub use pricing::{NumberFormat, discount_percent, format_number};
pub use product::{Product, ProductCategory, Question, Review, Specification};
pub use status::*;
pub use warehouse::{
    ShippingCost, ShippingLocation, ShippingPriceType, StockSummary, WarehouseStock,
};
