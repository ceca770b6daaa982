//! Integration tests for Mercadillo Global.
//!
//! These tests drive a running storefront over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start the storefront
//! cargo run -p mercadillo-cli -- migrate
//! cargo run -p mercadillo-cli -- seed demo --category MLG-OLLAS --count 25
//! cargo run -p mercadillo-storefront
//!
//! # Run the ignored tests against it
//! STOREFRONT_URL=http://localhost:8080 cargo test -p mercadillo-integration-tests -- --ignored
//! ```

use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// HTTP client that does not follow redirects, so status codes are observed as sent.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Extract the "next page" link of a category page, with HTML entities undone.
#[must_use]
pub fn next_page_href(html: &str) -> Option<String> {
    let rest = html.split("class=\"pagination__next\" href=\"").nth(1)?;
    let href = rest.split('"').next()?;
    Some(href.replace("&amp;", "&").replace("&#38;", "&"))
}

/// Count rendered product cards.
#[must_use]
pub fn product_card_count(html: &str) -> usize {
    html.matches("class=\"product-card\"").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_href() {
        let html = r#"<a class="pagination__first" href="/category/MLG-OLLAS?sort=newest">First</a>
            <a class="pagination__next" href="/category/MLG-OLLAS?cursor=abc_-&#38;sort=newest" rel="next">Next</a>"#;
        assert_eq!(
            next_page_href(html).as_deref(),
            Some("/category/MLG-OLLAS?cursor=abc_-&sort=newest")
        );
        assert_eq!(next_page_href("<a href=\"/\">Home</a>"), None);
    }

    #[test]
    fn test_product_card_count() {
        let html = r#"<div class="product-card"></div><div class="product-card"></div>"#;
        assert_eq!(product_card_count(html), 2);
    }
}
