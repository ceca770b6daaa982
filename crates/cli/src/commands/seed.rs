//! Seed the catalog with demo listings.
//!
//! Products are created `active`, linked to the chosen category (primary)
//! and to each of its ancestors, and given a few approved reviews and an
//! answered question so that every storefront page has something to show.
//! Each run also creates one warehouse that stocks every generated product
//! with a national flat rate and a per-kilogram rate.

use std::path::Path;

use chrono::{Duration, Utc};
use mercadillo_core::{
    CategoryTree, ProductId, ProductWarehouseId, SellerId, Specification, WarehouseId,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::info;

use super::{CommandError, connect, database_url};

const ADJECTIVES: &[&str] = &[
    "Clásico",
    "Compacto",
    "Premium",
    "Artesanal",
    "Ligero",
    "Reforzado",
];
const NOUNS: &[&str] = &["Modelo", "Set", "Kit", "Pack", "Edición", "Serie"];
const REVIEWERS: &[&str] = &["Ana", "Luis", "Carla", "Jorge", "Sofía", "Diego"];
const COMMENTS: &[&str] = &[
    "Muy buena calidad, llegó rápido.",
    "Cumple con lo prometido.",
    "Buen precio para lo que ofrece.",
    "Lo volvería a comprar.",
];

/// One generated listing.
#[derive(Debug, Clone, PartialEq)]
struct DemoProduct {
    slug: String,
    title: String,
    price: i64,
    original_price: i64,
    stock: i32,
    sold: i32,
    free_shipping: bool,
    /// Unit weight in grams.
    weight_grams: i64,
    /// Flat national shipping rate.
    shipping_cost: i64,
    review_ratings: Vec<i16>,
    specifications: Vec<Specification>,
    age_minutes: i64,
}

impl DemoProduct {
    /// Cached average of the generated reviews, two decimals.
    fn rating(&self) -> Decimal {
        if self.review_ratings.is_empty() {
            return Decimal::ZERO;
        }
        let total: i64 = self.review_ratings.iter().map(|r| i64::from(*r)).sum();
        let count = i64::try_from(self.review_ratings.len()).unwrap_or(i64::MAX);
        (Decimal::from(total) / Decimal::from(count)).round_dp(2)
    }

    fn weight_kg(&self) -> Decimal {
        Decimal::new(self.weight_grams, 3)
    }
}

fn generate(
    category_name: &str,
    category_slug: &str,
    index: u32,
    rng: &mut impl Rng,
) -> DemoProduct {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Nuevo");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Producto");
    let price = rng.random_range(5..2_000) * 10;
    let discounted = rng.random_bool(0.4);
    let review_count = rng.random_range(0..5);

    DemoProduct {
        slug: format!("{category_slug}-demo-{index}"),
        title: format!("{category_name} {adjective} {noun} {index}"),
        price,
        original_price: if discounted { price + price / 4 } else { 0 },
        stock: rng.random_range(0..50),
        sold: rng.random_range(0..200),
        free_shipping: rng.random_bool(0.5),
        weight_grams: rng.random_range(100..20_000),
        shipping_cost: rng.random_range(5..60) * 10,
        review_ratings: (0..review_count).map(|_| rng.random_range(1..=5)).collect(),
        specifications: vec![
            Specification {
                name: "Garantía".to_owned(),
                value: format!("{} meses", rng.random_range(1..=24)),
            },
            Specification {
                name: "Origen".to_owned(),
                value: "Importado".to_owned(),
            },
        ],
        age_minutes: i64::from(index) * 37,
    }
}

/// Insert `count` demo products into `category_id`.
///
/// # Errors
///
/// Returns an error if the category document cannot be read, the category
/// id is unknown, or a database operation fails. Nothing is written unless
/// every insert succeeds.
pub async fn demo(category_id: &str, count: u32, categories_path: &Path) -> Result<(), CommandError> {
    let document = tokio::fs::read_to_string(categories_path)
        .await
        .map_err(|e| CommandError::Invalid(format!("{}: {e}", categories_path.display())))?;
    let tree = CategoryTree::from_json(&document)
        .map_err(|e| CommandError::Invalid(format!("{}: {e}", categories_path.display())))?;
    let path: Vec<String> = tree.path(category_id).iter().map(|c| c.id.clone()).collect();
    let category = tree
        .get(category_id)
        .ok_or_else(|| CommandError::Invalid(format!("unknown category: {category_id}")))?;

    let products: Vec<DemoProduct> = {
        let mut rng = rand::rng();
        let slug = category_id.to_lowercase();
        (1..=count)
            .map(|i| generate(&category.name, &slug, i, &mut rng))
            .collect()
    };

    // All demo listings of one run share a seller
    let seller_id = SellerId::generate();
    let pool = connect(&database_url()?).await?;
    let mut tx = pool.begin().await?;
    let warehouse_id: WarehouseId = sqlx::query_scalar(
        r"
        INSERT INTO storefront.warehouse (seller_id, name, country, state, city, address)
        VALUES ($1, 'Bodega demo', 'MX', 'Jalisco', 'Guadalajara', 'Av. Vallarta 1000')
        RETURNING id
        ",
    )
    .bind(seller_id)
    .fetch_one(&mut *tx)
    .await?;
    for product in &products {
        let product_id = insert(&mut tx, product, seller_id, category.is_service, &path).await?;
        stock(&mut tx, product, product_id, warehouse_id).await?;
    }
    tx.commit().await?;

    info!(category = %category_id, count, "Demo products inserted");
    Ok(())
}

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    product: &DemoProduct,
    seller_id: SellerId,
    is_service: bool,
    category_path: &[String],
) -> Result<ProductId, CommandError> {
    let created_at = Utc::now() - Duration::minutes(product.age_minutes);
    let specifications = serde_json::to_value(&product.specifications)
        .map_err(|e| CommandError::Invalid(e.to_string()))?;

    let product_id: ProductId = sqlx::query_scalar(
        r"
        INSERT INTO storefront.product (
            slug, seller_id, title, description, price, original_price,
            images, rating, review_count, sold, stock, is_service,
            free_shipping, specifications, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, 'active', $15, $15)
        ON CONFLICT (slug) DO UPDATE SET updated_at = EXCLUDED.updated_at
        RETURNING id
        ",
    )
    .bind(&product.slug)
    .bind(seller_id)
    .bind(&product.title)
    .bind(format!("{} de demostración.", product.title))
    .bind(product.price)
    .bind(product.original_price)
    .bind(vec![format!("https://picsum.photos/seed/{}/600/600", product.slug)])
    .bind(product.rating())
    .bind(i32::try_from(product.review_ratings.len()).unwrap_or(i32::MAX))
    .bind(product.sold)
    .bind(product.stock)
    .bind(is_service)
    .bind(product.free_shipping)
    .bind(specifications)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await?;

    let leaf = category_path.last();
    for category_id in category_path {
        sqlx::query(
            r"
            INSERT INTO storefront.product_category (product_id, category_id, is_primary)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, category_id) DO NOTHING
            ",
        )
        .bind(product_id)
        .bind(category_id)
        .bind(Some(category_id) == leaf)
        .execute(&mut **tx)
        .await?;
    }

    for (i, rating) in product.review_ratings.iter().enumerate() {
        let name = REVIEWERS.get(i % REVIEWERS.len()).copied().unwrap_or("Anónimo");
        let comment = COMMENTS.get(i % COMMENTS.len()).copied().unwrap_or_default();
        sqlx::query(
            r"
            INSERT INTO storefront.review (product_id, name, rating, comment, status)
            VALUES ($1, $2, $3, $4, 'approved')
            ",
        )
        .bind(product_id)
        .bind(name)
        .bind(rating)
        .bind(comment)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query(
        r"
        INSERT INTO storefront.question (product_id, question, answer, answered_by_ia, status)
        VALUES ($1, '¿Tienen stock disponible?', 'Sí, enviamos en 24 horas.', FALSE, 'answered')
        ",
    )
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    Ok(product_id)
}

/// Stock `product` in `warehouse_id` and give it two shipping rates.
async fn stock(
    tx: &mut Transaction<'_, Postgres>,
    product: &DemoProduct,
    product_id: ProductId,
    warehouse_id: WarehouseId,
) -> Result<(), CommandError> {
    let product_warehouse_id: ProductWarehouseId = sqlx::query_scalar(
        r"
        INSERT INTO storefront.product_warehouse (product_id, warehouse_id, quantity, weight_kg)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (product_id, warehouse_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(product.stock)
    .bind(product.weight_kg())
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO storefront.shipping_cost (
            product_warehouse_id, country, cost, price_type,
            estimated_days_min, estimated_days_max
        )
        VALUES ($1, 'MX', $2, 'fixed', 3, 7)
        ",
    )
    .bind(product_warehouse_id)
    .bind(Decimal::from(product.shipping_cost))
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO storefront.shipping_cost (
            product_warehouse_id, country, locations, cost, price_type,
            max_weight_kg, estimated_days_min, estimated_days_max
        )
        VALUES ($1, 'MX', '[{"state": "Jalisco"}]', 25, 'per_kg', 10, 1, 2)
        "#,
    )
    .bind(product_warehouse_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_product_is_consistent() {
        let mut rng = rand::rng();
        for i in 1..=50 {
            let product = generate("Cocina", "mlg-cocina", i, &mut rng);
            assert_eq!(product.slug, format!("mlg-cocina-demo-{i}"));
            assert!(product.price > 0);
            assert!(product.original_price == 0 || product.original_price > product.price);
            assert!(product.review_ratings.iter().all(|r| (1..=5).contains(r)));
            assert!(product.rating() <= Decimal::from(5));
            assert!(product.weight_kg() >= Decimal::new(1, 1));
            assert!(product.weight_kg() < Decimal::from(20));
            assert!(product.shipping_cost >= 50);
        }
    }

    #[test]
    fn test_rating_average() {
        let mut product = generate("Cocina", "mlg-cocina", 1, &mut rand::rng());
        product.review_ratings = vec![5, 4, 4];
        assert_eq!(product.rating(), Decimal::new(433, 2));

        product.review_ratings.clear();
        assert_eq!(product.rating(), Decimal::ZERO);
    }
}
