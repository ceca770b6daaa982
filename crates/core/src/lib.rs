//! Mercadillo Global Core - Shared types and catalog algorithms.
//!
//! This crate provides the domain model used across all Mercadillo components:
//! - `storefront` - Public-facing marketplace site
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and lets the
//! listing semantics be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - IDs, statuses, products, warehouse stock, shipping rates and price formatting
//! - [`catalog`] - Category tree, listing filters and keyset cursors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
