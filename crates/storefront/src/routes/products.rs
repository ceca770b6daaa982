//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use mercadillo_core::{
    Category, NumberFormat, ProductId, Question, Review, ShippingCost, WarehouseStock,
};
use tracing::instrument;

use super::{Layout, not_found_page, parse_product_id};
use crate::db::{FeedbackRepository, ProductRepository, WarehouseRepository};
use crate::error::{Result, product_breadcrumb};
use crate::filters;
use crate::i18n::Language;
use crate::services::{EnrichedProduct, enrich};
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate<'a> {
    pub layout: Layout<'a>,
    pub product: EnrichedProduct<'a>,
    /// Root-to-leaf path of the primary category.
    pub breadcrumb: Vec<&'a Category>,
    pub reviews: Vec<Review>,
    pub questions: Vec<Question>,
}

/// Display a product detail page.
///
/// Unknown, malformed, or inactive product ids get the 404 page. Reviews,
/// questions, warehouse stock and shipping rates that fail to load are left
/// out rather than failing the page.
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
    product_breadcrumb("navigation", "Viewed product page", id);

    let links = products.categories_of(&[id]).await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch product categories: {e}");
        Vec::new()
    });

    let feedback = FeedbackRepository::new(state.pool());
    let (reviews, questions) =
        tokio::join!(feedback.approved_reviews(id), feedback.answered_questions(id));
    let reviews = reviews.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch reviews: {e}");
        Vec::new()
    });
    let questions = questions.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch questions: {e}");
        Vec::new()
    });

    let (stock, costs) = logistics(&state, id).await;
    let tree = state.categories();
    let product = enrich(product, &links, tree, NumberFormat::Grouped).with_logistics(
        stock,
        &costs,
        NumberFormat::Grouped,
    );
    let breadcrumb = product
        .primary_category
        .map(|c| tree.path(&c.id))
        .unwrap_or_default();

    Ok(ProductTemplate {
        layout: Layout::with_title(&state, language, &product.product.title),
        product,
        breadcrumb,
        reviews,
        questions,
    }
    .into_response())
}

/// Warehouse stock and shipping rates of a product, empty on failure.
pub(super) async fn logistics(
    state: &AppState,
    id: ProductId,
) -> (Vec<WarehouseStock>, Vec<ShippingCost>) {
    let warehouses = WarehouseRepository::new(state.pool());
    let (stock, costs) = tokio::join!(warehouses.stock_of(id), warehouses.shipping_costs_of(id));
    let stock = stock.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch warehouse stock: {e}");
        Vec::new()
    });
    let costs = costs.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch shipping costs: {e}");
        Vec::new()
    });
    (stock, costs)
}
