//! Page-level errors and Sentry breadcrumbs.
//!
//! Most listing failures degrade to an empty section of the page. The product
//! and checkout pages cannot render without their product, so a failed lookup
//! there surfaces as an [`AppError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mercadillo_core::ProductId;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors a page handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading the page's main record failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Missing records render the 404 page directly, so every `AppError` is
    /// a server-side failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(error = %self, sentry_event_id = %event_id, "Page failed");
        (self.status(), "Internal server error").into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a shopper step that concerns one product.
///
/// Shows up in the trail attached to later Sentry reports.
pub fn product_breadcrumb(category: &str, message: &str, product_id: ProductId) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "product_id".to_owned(),
        serde_json::Value::String(product_id.to_string()),
    );
    sentry::add_breadcrumb(breadcrumb);
}
