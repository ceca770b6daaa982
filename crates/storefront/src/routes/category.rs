//! Category listing page.
//!
//! Query parameters are parsed leniently: numbers that do not parse are
//! ignored, unknown sort values mean `newest`, and an unreadable cursor
//! restarts the listing from the first page.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use mercadillo_core::{CategoryFilters, NumberFormat, ProductId, SortBy};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::db::ProductRepository;
use crate::filters;
use crate::i18n::Language;
use crate::services::{CursorPage, EnrichedProduct, enrich_all, products_by_category_cursor};
use crate::state::AppState;

/// Shown when the category id is not in the tree.
const UNKNOWN_CATEGORY: &str = "Unknown category";

// =============================================================================
// Query parameters
// =============================================================================

/// Raw category page query string.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    pub cursor: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
    pub sales: Option<String>,
    pub shipping: Option<String>,
    pub sort: Option<String>,
}

fn lenient<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

impl CategoryParams {
    /// Filters described by the query string.
    #[must_use]
    pub fn filters(&self) -> CategoryFilters {
        CategoryFilters {
            price_min: lenient(self.price_min.as_deref()),
            price_max: lenient(self.price_max.as_deref()),
            rating: lenient(self.rating.as_deref()),
            reviews: lenient(self.reviews.as_deref()),
            sales: lenient(self.sales.as_deref()),
            free_shipping: match self.shipping.as_deref() {
                Some("free") => Some(true),
                Some("nonfree") => Some(false),
                _ => None,
            },
            sort_by: self
                .sort
                .as_deref()
                .map(SortBy::parse_lenient)
                .unwrap_or_default(),
        }
    }

    /// Query string for `category_id` with the current filters and `cursor`.
    #[must_use]
    pub fn href(&self, category_id: &str, cursor: Option<&str>) -> String {
        let params = [
            ("price_min", self.price_min.as_deref()),
            ("price_max", self.price_max.as_deref()),
            ("rating", self.rating.as_deref()),
            ("reviews", self.reviews.as_deref()),
            ("sales", self.sales.as_deref()),
            ("shipping", self.shipping.as_deref()),
            ("sort", self.sort.as_deref()),
            ("cursor", cursor),
        ];
        let query: Vec<String> = params
            .iter()
            .filter_map(|(name, value)| {
                value
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{name}={}", urlencoding::encode(v)))
            })
            .collect();

        let path = format!("/category/{}", urlencoding::encode(category_id));
        if query.is_empty() {
            path
        } else {
            format!("{path}?{}", query.join("&"))
        }
    }

    /// Link that drops every filter but keeps the sort order, when any
    /// filter is active.
    #[must_use]
    pub fn clear_filters_href(&self, category_id: &str) -> Option<String> {
        self.filters().is_filtering().then(|| {
            Self {
                sort: self.sort.clone(),
                ..Self::default()
            }
            .href(category_id, None)
        })
    }
}

// =============================================================================
// Filter sidebar
// =============================================================================

/// One selectable filter value.
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A group of mutually exclusive filter values.
pub struct FilterGroup {
    pub id: &'static str,
    pub name: &'static str,
    pub options: Vec<FilterOption>,
}

fn group(
    id: &'static str,
    name: &'static str,
    current: Option<&str>,
    options: &[(&'static str, &'static str)],
) -> FilterGroup {
    FilterGroup {
        id,
        name,
        options: options
            .iter()
            .map(|&(value, label)| FilterOption {
                value,
                label,
                selected: current == Some(value),
            })
            .collect(),
    }
}

/// Sidebar filter groups with the current selection marked.
#[must_use]
pub fn filter_groups(params: &CategoryParams) -> Vec<FilterGroup> {
    vec![
        group(
            "rating",
            "Rating",
            params.rating.as_deref(),
            &[("4", "4 stars or more"), ("3", "3 stars or more"), ("2", "2 stars or more")],
        ),
        group(
            "reviews",
            "Number of reviews",
            params.reviews.as_deref(),
            &[("3", "3 or more"), ("1", "1 or more"), ("0", "None")],
        ),
        group(
            "sales",
            "Number of sales",
            params.sales.as_deref(),
            &[("3", "3 or more"), ("1", "1 or more"), ("0", "None")],
        ),
        group(
            "shipping",
            "Shipping",
            params.shipping.as_deref(),
            &[("free", "Free shipping"), ("nonfree", "No free shipping")],
        ),
    ]
}

/// Sort selector entry.
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn sort_options(current: SortBy) -> Vec<SortOption> {
    SortBy::ALL
        .iter()
        .map(|&sort| SortOption {
            value: sort.as_str(),
            label: match sort {
                SortBy::Newest => "Newest",
                SortBy::PriceAsc => "Lowest price",
                SortBy::PriceDesc => "Highest price",
                SortBy::Rating => "Best rated",
                SortBy::Sales => "Best selling",
            },
            selected: sort == current,
        })
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

/// Next/previous links for a cursor page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub has_next: bool,
    pub has_prev: bool,
    pub next_href: String,
    /// Cursors only run forward, so "previous" goes back to the first page.
    pub first_href: String,
}

impl PaginationView {
    #[must_use]
    pub fn new(params: &CategoryParams, category_id: &str, page: &CursorPage) -> Self {
        Self {
            has_next: page.has_more,
            has_prev: params.cursor.as_deref().is_some_and(|c| !c.is_empty()),
            next_href: if page.has_more && !page.next_cursor.is_empty() {
                params.href(category_id, Some(&page.next_cursor))
            } else {
                String::new()
            },
            first_href: params.href(category_id, None),
        }
    }
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate<'a> {
    pub layout: Layout<'a>,
    pub category_id: String,
    pub category_name: &'a str,
    pub breadcrumb: Vec<&'a mercadillo_core::Category>,
    pub subcategories: Vec<&'a mercadillo_core::Category>,
    pub products: Vec<EnrichedProduct<'a>>,
    pub filter_groups: Vec<FilterGroup>,
    pub sort_options: Vec<SortOption>,
    pub price_min: String,
    pub price_max: String,
    pub clear_filters_href: Option<String>,
    pub pagination: PaginationView,
}

/// Display a category listing page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Query(params): Query<CategoryParams>,
    language: Language,
) -> Response {
    let filters = params.filters();
    let repository = ProductRepository::new(state.pool());

    let page = products_by_category_cursor(
        &repository,
        state.cursor_codec(),
        &category_id,
        params.cursor.as_deref(),
        state.config().page_size,
        filters.clone(),
    )
    .await
    .unwrap_or_else(|e| {
        tracing::error!("Failed to fetch category products: {e}");
        CursorPage::default()
    });

    let pagination = PaginationView::new(&params, &category_id, &page);
    let clear_filters_href = params.clear_filters_href(&category_id);
    let ids: Vec<ProductId> = page.products.iter().map(|p| p.id).collect();
    let links = repository.categories_of(&ids).await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch listing categories: {e}");
        Vec::new()
    });

    let tree = state.categories();
    let i18n = state.translations().translator(language);
    let category = tree.get(&category_id);
    let category_name = category.map_or_else(|| i18n.t(UNKNOWN_CATEGORY), |c| c.name.as_str());

    CategoryTemplate {
        layout: Layout::with_title(&state, language, category_name),
        breadcrumb: tree.path(&category_id),
        subcategories: category
            .map(|c| c.children.iter().map(Arc::as_ref).collect())
            .unwrap_or_default(),
        category_name,
        category_id,
        products: enrich_all(page.products, &links, tree, NumberFormat::Grouped),
        filter_groups: filter_groups(&params),
        sort_options: sort_options(filters.sort_by),
        price_min: params.price_min.clone().unwrap_or_default(),
        price_max: params.price_max.clone().unwrap_or_default(),
        clear_filters_href,
        pagination,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CategoryParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/category/A1?{query}").parse().unwrap();
        Query::<CategoryParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_filters_parse_leniently() {
        let filters = params(&[
            ("price_min", "100"),
            ("price_max", "abc"),
            ("rating", "4"),
            ("reviews", "0"),
            ("shipping", "nonfree"),
            ("sort", "price_desc"),
        ])
        .filters();

        assert_eq!(filters.price_min, Some(100));
        assert_eq!(filters.price_max, None);
        assert_eq!(filters.rating, Some(4));
        assert_eq!(filters.reviews, Some(0));
        assert_eq!(filters.sales, None);
        assert_eq!(filters.free_shipping, Some(false));
        assert_eq!(filters.sort_by, SortBy::PriceDesc);
    }

    #[test]
    fn test_unknown_values_are_ignored() {
        let filters = params(&[("shipping", "express"), ("sort", "cheapest")]).filters();
        assert_eq!(filters.free_shipping, None);
        assert_eq!(filters.sort_by, SortBy::Newest);
        assert!(!filters.is_filtering());
    }

    #[test]
    fn test_href_keeps_filters_and_encodes_cursor() {
        let params = params(&[("sort", "rating"), ("shipping", "free")]);
        assert_eq!(
            params.href("A1", Some("a+b/c")),
            "/category/A1?shipping=free&sort=rating&cursor=a%2Bb%2Fc"
        );
        assert_eq!(params.href("A1", None), "/category/A1?shipping=free&sort=rating");
        assert_eq!(CategoryParams::default().href("A 1", None), "/category/A%201");
    }

    #[test]
    fn test_clear_filters_link_only_when_filtering() {
        let filtered = params(&[("rating", "4"), ("shipping", "free"), ("sort", "price_asc")]);
        assert_eq!(
            filtered.clear_filters_href("A1").as_deref(),
            Some("/category/A1?sort=price_asc")
        );

        let sorted_only = params(&[("sort", "price_asc"), ("price_min", "abc")]);
        assert_eq!(sorted_only.clear_filters_href("A1"), None);
    }

    #[test]
    fn test_pagination_links() {
        let first = params(&[("sort", "sales")]);
        let page = CursorPage {
            products: Vec::new(),
            next_cursor: "tok".to_owned(),
            has_more: true,
        };
        let view = PaginationView::new(&first, "A1", &page);
        assert!(view.has_next);
        assert!(!view.has_prev);
        assert_eq!(view.next_href, "/category/A1?sort=sales&cursor=tok");

        let later = params(&[("sort", "sales"), ("cursor", "tok")]);
        let view = PaginationView::new(&later, "A1", &CursorPage::default());
        assert!(!view.has_next);
        assert!(view.has_prev);
        assert!(view.next_href.is_empty());
        assert_eq!(view.first_href, "/category/A1?sort=sales");
    }

    #[test]
    fn test_filter_groups_mark_selection() {
        let groups = filter_groups(&params(&[("reviews", "0")]));
        let reviews = groups.iter().find(|g| g.id == "reviews").unwrap();
        let selected: Vec<&str> = reviews
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec!["0"]);
    }

    #[test]
    fn test_sort_options_cover_every_mode() {
        let options = sort_options(SortBy::Rating);
        assert_eq!(options.len(), SortBy::ALL.len());
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }
}
