//! Seller warehouses, per-warehouse stock and shipping rates.
//!
//! A product is stocked in zero or more of its seller's warehouses. Each
//! stocking row carries the unit weight and its own list of shipping rates.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::{ProductWarehouseId, ShippingCostId, WarehouseId};

/// How a shipping rate is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.shipping_price_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPriceType {
    /// Flat amount per shipment.
    #[default]
    Fixed,
    /// Amount per kilogram shipped.
    PerKg,
}

/// Stock of one product held in one active warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseStock {
    pub product_warehouse_id: ProductWarehouseId,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub state: String,
    pub city: String,
    pub quantity: i32,
    /// Weight of one unit, in kilograms.
    pub weight_kg: Decimal,
}

/// Region a shipping rate applies to within its country.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cities: Vec<String>,
}

/// An active shipping rate offered from one stocking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingCost {
    pub id: ShippingCostId,
    pub product_warehouse_id: ProductWarehouseId,
    /// Destination country, ISO 3166-1 alpha-2.
    pub country: String,
    /// Empty means the whole country.
    pub locations: Vec<ShippingLocation>,
    pub cost: Decimal,
    pub currency_id: String,
    pub price_type: ShippingPriceType,
    /// Weight band, only meaningful for [`ShippingPriceType::PerKg`].
    pub min_weight_kg: Option<Decimal>,
    pub max_weight_kg: Option<Decimal>,
    pub estimated_days_min: Option<i32>,
    pub estimated_days_max: Option<i32>,
}

impl ShippingCost {
    /// Price of shipping `weight_kg` with this rate.
    #[must_use]
    pub fn cost_for(&self, weight_kg: Decimal) -> Decimal {
        match self.price_type {
            ShippingPriceType::Fixed => self.cost,
            ShippingPriceType::PerKg => self.cost * weight_kg,
        }
    }

    /// Whether a parcel of `weight_kg` falls inside this rate's weight band.
    ///
    /// Fixed rates ignore the band.
    #[must_use]
    pub fn accepts_weight(&self, weight_kg: Decimal) -> bool {
        match self.price_type {
            ShippingPriceType::Fixed => true,
            ShippingPriceType::PerKg => {
                self.min_weight_kg.is_none_or(|min| weight_kg >= min)
                    && self.max_weight_kg.is_none_or(|max| weight_kg <= max)
            }
        }
    }

    /// Delivery estimate such as `3-5`, or a single bound when only one is set.
    #[must_use]
    pub fn estimated_days(&self) -> Option<String> {
        match (self.estimated_days_min, self.estimated_days_max) {
            (Some(min), Some(max)) if min == max => Some(min.to_string()),
            (Some(min), Some(max)) => Some(format!("{min}-{max}")),
            (Some(days), None) | (None, Some(days)) => Some(days.to_string()),
            (None, None) => None,
        }
    }
}

/// Totals over every warehouse stocking a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockSummary {
    pub total_stock: i32,
    /// Combined weight of all units in stock, in whole grams.
    pub total_weight_grams: i64,
}

impl StockSummary {
    /// Sum quantities and unit weights across `warehouses`.
    ///
    /// Negative quantities count as zero. The weight is truncated to grams.
    #[must_use]
    pub fn of(warehouses: &[WarehouseStock]) -> Self {
        let (units, kilograms) =
            warehouses
                .iter()
                .fold((0_i32, Decimal::ZERO), |(units, kilograms), w| {
                    let quantity = w.quantity.max(0);
                    (
                        units.saturating_add(quantity),
                        kilograms + w.weight_kg * Decimal::from(quantity),
                    )
                });

        let grams = (kilograms * Decimal::from(1000)).trunc();
        Self {
            total_stock: units,
            total_weight_grams: grams.to_i64().unwrap_or(i64::MAX),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn stock(quantity: i32, weight_kg: Decimal) -> WarehouseStock {
        WarehouseStock {
            product_warehouse_id: ProductWarehouseId::generate(),
            warehouse_id: WarehouseId::generate(),
            warehouse_name: "Central".to_owned(),
            country: "MX".to_owned(),
            state: "Jalisco".to_owned(),
            city: "Guadalajara".to_owned(),
            quantity,
            weight_kg,
        }
    }

    fn rate(price_type: ShippingPriceType, cost: Decimal) -> ShippingCost {
        ShippingCost {
            id: ShippingCostId::generate(),
            product_warehouse_id: ProductWarehouseId::generate(),
            country: "MX".to_owned(),
            locations: Vec::new(),
            cost,
            currency_id: "USD".to_owned(),
            price_type,
            min_weight_kg: None,
            max_weight_kg: None,
            estimated_days_min: None,
            estimated_days_max: None,
        }
    }

    #[test]
    fn test_stock_summary_sums_warehouses() {
        let summary = StockSummary::of(&[
            stock(3, Decimal::new(1_250, 3)),
            stock(2, Decimal::new(500, 3)),
        ]);
        assert_eq!(summary.total_stock, 5);
        // 3 * 1.25 kg + 2 * 0.5 kg
        assert_eq!(summary.total_weight_grams, 4_750);
    }

    #[test]
    fn test_stock_summary_truncates_grams_and_ignores_negative_stock() {
        let summary = StockSummary::of(&[
            stock(1, Decimal::new(12_345, 4)),
            stock(-4, Decimal::from(10)),
        ]);
        assert_eq!(summary.total_stock, 1);
        assert_eq!(summary.total_weight_grams, 1_234);
        assert_eq!(StockSummary::of(&[]), StockSummary::default());
    }

    #[test]
    fn test_fixed_rate_ignores_weight() {
        let fixed = rate(ShippingPriceType::Fixed, Decimal::new(1_500, 2));
        assert_eq!(fixed.cost_for(Decimal::from(40)), Decimal::new(1_500, 2));
        assert_eq!(fixed.cost_for(Decimal::ZERO), Decimal::new(1_500, 2));
    }

    #[test]
    fn test_per_kg_rate_scales_with_weight() {
        let per_kg = rate(ShippingPriceType::PerKg, Decimal::new(250, 2));
        assert_eq!(per_kg.cost_for(Decimal::new(15, 1)), Decimal::new(375, 2));
        assert_eq!(per_kg.cost_for(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_weight_band_applies_to_per_kg_only() {
        let mut per_kg = rate(ShippingPriceType::PerKg, Decimal::ONE);
        per_kg.min_weight_kg = Some(Decimal::ONE);
        per_kg.max_weight_kg = Some(Decimal::from(5));
        assert!(!per_kg.accepts_weight(Decimal::new(5, 1)));
        assert!(per_kg.accepts_weight(Decimal::ONE));
        assert!(per_kg.accepts_weight(Decimal::from(5)));
        assert!(!per_kg.accepts_weight(Decimal::new(51, 1)));

        let mut fixed = rate(ShippingPriceType::Fixed, Decimal::ONE);
        fixed.max_weight_kg = Some(Decimal::ONE);
        assert!(fixed.accepts_weight(Decimal::from(50)));
    }

    #[test]
    fn test_estimated_days() {
        let mut r = rate(ShippingPriceType::Fixed, Decimal::ONE);
        assert_eq!(r.estimated_days(), None);
        r.estimated_days_min = Some(3);
        assert_eq!(r.estimated_days().as_deref(), Some("3"));
        r.estimated_days_max = Some(5);
        assert_eq!(r.estimated_days().as_deref(), Some("3-5"));
        r.estimated_days_min = Some(5);
        assert_eq!(r.estimated_days().as_deref(), Some("5"));
    }

    #[test]
    fn test_location_json_shape() {
        let locations: Vec<ShippingLocation> =
            serde_json::from_str(r#"[{"state": "Jalisco", "cities": ["Zapopan"]}, {}]"#).unwrap();
        assert_eq!(locations[0].state.as_deref(), Some("Jalisco"));
        assert_eq!(locations[0].cities, vec!["Zapopan".to_owned()]);
        assert_eq!(locations[1], ShippingLocation::default());
    }
}
