//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (featured products, category roots)
//! GET  /category/{category_id}  - Category listing with filters and cursor pagination
//! GET  /product/{product_id}    - Product detail with reviews and questions
//! GET  /checkout/{product_id}   - Checkout summary for a single product
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database ping)
//! ```
//!
//! Every page reads the `X-Language` header; see [`crate::i18n`].

pub mod category;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use mercadillo_core::{Category, ProductId};

use crate::filters;
use crate::i18n::{Language, Translator};
use crate::state::AppState;

/// Site name appended to page titles.
pub const SITE_NAME: &str = "Mercadillo Global";

/// Data shared by every page layout.
pub struct Layout<'a> {
    pub i18n: Translator<'a>,
    /// Category roots for the navigation bar.
    pub nav: &'a [Arc<Category>],
    pub title: String,
}

impl<'a> Layout<'a> {
    /// Layout for a page titled `title` (untranslated).
    #[must_use]
    pub fn new(state: &'a AppState, language: Language, title: &str) -> Self {
        let i18n = state.translations().translator(language);
        Self {
            title: format!("{} - {SITE_NAME}", i18n.t(title)),
            i18n,
            nav: state.categories().roots(),
        }
    }

    /// Layout whose title is already display text, such as a product name.
    #[must_use]
    pub fn with_title(state: &'a AppState, language: Language, title: &str) -> Self {
        Self {
            title: format!("{title} - {SITE_NAME}"),
            i18n: state.translations().translator(language),
            nav: state.categories().roots(),
        }
    }
}

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub layout: Layout<'a>,
}

/// Render the 404 page.
#[must_use]
pub fn not_found_page(state: &AppState, language: Language) -> Response {
    let page = NotFoundTemplate {
        layout: Layout::new(state, language, "Page not found"),
    };
    (StatusCode::NOT_FOUND, page).into_response()
}

/// Parse a product id path segment; malformed ids are treated as absent.
#[must_use]
pub fn parse_product_id(raw: &str) -> Option<ProductId> {
    raw.parse().ok()
}

/// Fallback handler for unknown paths.
pub async fn fallback(State(state): State<AppState>, language: Language) -> Response {
    not_found_page(&state, language)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/category/{category_id}", get(category::show))
        .route("/product/{product_id}", get(products::show))
        .route("/checkout/{product_id}", get(checkout::show))
        .fallback(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id() {
        let id = ProductId::generate();
        assert_eq!(parse_product_id(&id.to_string()), Some(id));
        assert_eq!(parse_product_id("not-a-uuid"), None);
        assert_eq!(parse_product_id(""), None);
    }
}
