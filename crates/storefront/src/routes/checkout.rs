//! Single-product checkout summary.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use mercadillo_core::NumberFormat;
use tracing::instrument;

use super::products::logistics;
use super::{Layout, not_found_page, parse_product_id};
use crate::db::ProductRepository;
use crate::error::{Result, product_breadcrumb};
use crate::filters;
use crate::i18n::Language;
use crate::services::{EnrichedProduct, enrich};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate<'a> {
    pub layout: Layout<'a>,
    pub product: EnrichedProduct<'a>,
}

/// Display the checkout summary for one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    language: Language,
) -> Result<Response> {
    let Some(id) = parse_product_id(&product_id) else {
        return Ok(not_found_page(&state, language));
    };

    let products = ProductRepository::new(state.pool());
    let Some(product) = products.get_active(id).await? else {
        return Ok(not_found_page(&state, language));
    };
    product_breadcrumb("checkout", "Started checkout", id);

    let links = products.categories_of(&[id]).await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch product categories: {e}");
        Vec::new()
    });
    let (stock, costs) = logistics(&state, id).await;
    let product = enrich(product, &links, state.categories(), NumberFormat::Grouped)
        .with_logistics(stock, &costs, NumberFormat::Grouped);

    let title = format!(
        "{} - {}",
        state.translations().translator(language).t("Checkout"),
        product.product.title
    );
    Ok(CheckoutTemplate {
        layout: Layout::with_title(&state, language, &title),
        product,
    }
    .into_response())
}
