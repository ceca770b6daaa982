//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use mercadillo_core::{NumberFormat, ProductId};
use tracing::instrument;

use super::Layout;
use crate::db::ProductRepository;
use crate::filters;
use crate::i18n::Language;
use crate::services::{EnrichedProduct, enrich_all};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub layout: Layout<'a>,
    pub featured: Vec<EnrichedProduct<'a>>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>, language: Language) -> Response {
    let products = state
        .featured()
        .pick(state.pool())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch featured products: {e}");
            Vec::new()
        });

    let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    let links = ProductRepository::new(state.pool())
        .categories_of(&ids)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch featured product categories: {e}");
            Vec::new()
        });

    HomeTemplate {
        layout: Layout::new(&state, language, "Buy and sell online"),
        featured: enrich_all(products, &links, state.categories(), NumberFormat::Grouped),
    }
    .into_response()
}
