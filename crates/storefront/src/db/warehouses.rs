//! Warehouse stock and shipping rates of a product.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use mercadillo_core::{
    ProductId, ProductWarehouseId, ShippingCost, ShippingCostId, ShippingLocation,
    ShippingPriceType, WarehouseId, WarehouseStock,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    product_warehouse_id: ProductWarehouseId,
    warehouse_id: WarehouseId,
    warehouse_name: String,
    country: String,
    state: String,
    city: String,
    quantity: i32,
    weight_kg: Decimal,
}

impl From<StockRow> for WarehouseStock {
    fn from(r: StockRow) -> Self {
        Self {
            product_warehouse_id: r.product_warehouse_id,
            warehouse_id: r.warehouse_id,
            warehouse_name: r.warehouse_name,
            country: r.country,
            state: r.state,
            city: r.city,
            quantity: r.quantity,
            weight_kg: r.weight_kg,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShippingCostRow {
    id: ShippingCostId,
    product_warehouse_id: ProductWarehouseId,
    country: String,
    locations: Json<Vec<ShippingLocation>>,
    cost: Decimal,
    currency_id: String,
    price_type: ShippingPriceType,
    min_weight_kg: Option<Decimal>,
    max_weight_kg: Option<Decimal>,
    estimated_days_min: Option<i32>,
    estimated_days_max: Option<i32>,
}

impl From<ShippingCostRow> for ShippingCost {
    fn from(r: ShippingCostRow) -> Self {
        Self {
            id: r.id,
            product_warehouse_id: r.product_warehouse_id,
            country: r.country,
            locations: r.locations.0,
            cost: r.cost,
            currency_id: r.currency_id,
            price_type: r.price_type,
            min_weight_kg: r.min_weight_kg,
            max_weight_kg: r.max_weight_kg,
            estimated_days_min: r.estimated_days_min,
            estimated_days_max: r.estimated_days_max,
        }
    }
}

/// Repository for warehouse stock and shipping rates.
pub struct WarehouseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WarehouseRepository<'a> {
    /// Create a new warehouse repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stock of a product in each of its active warehouses, largest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_of(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<WarehouseStock>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockRow>(
            r"
            SELECT pw.id AS product_warehouse_id, w.id AS warehouse_id,
                   w.name AS warehouse_name, w.country, w.state, w.city,
                   pw.quantity, pw.weight_kg
            FROM storefront.product_warehouse pw
            JOIN storefront.warehouse w ON w.id = pw.warehouse_id
            WHERE pw.product_id = $1 AND w.is_active
            ORDER BY pw.quantity DESC, w.name
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WarehouseStock::from).collect())
    }

    /// Active shipping rates offered from any active warehouse stocking a
    /// product, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_costs_of(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ShippingCost>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShippingCostRow>(
            r"
            SELECT sc.id, sc.product_warehouse_id, sc.country, sc.locations,
                   sc.cost, sc.currency_id, sc.price_type, sc.min_weight_kg,
                   sc.max_weight_kg, sc.estimated_days_min, sc.estimated_days_max
            FROM storefront.shipping_cost sc
            JOIN storefront.product_warehouse pw ON pw.id = sc.product_warehouse_id
            JOIN storefront.warehouse w ON w.id = pw.warehouse_id
            WHERE pw.product_id = $1 AND sc.is_active AND w.is_active
            ORDER BY sc.cost, sc.country
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ShippingCost::from).collect())
    }
}
