//! Display-ready product views.

use std::collections::HashMap;

use mercadillo_core::{
    Category, CategoryTree, NumberFormat, Product, ProductCategory, ProductId, ShippingCost,
    ShippingLocation, StockSummary, WarehouseStock, discount_percent, format_number,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Number of stars in a rating widget.
pub const STAR_COUNT: usize = 5;

/// One star of a rating widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Star {
    pub index: usize,
    pub filled: bool,
}

/// A product with the fields templates need precomputed.
#[derive(Debug, Clone)]
pub struct EnrichedProduct<'a> {
    pub product: Product,
    pub formatted_price: String,
    pub formatted_original_price: String,
    pub discount: i32,
    pub stars: [Star; STAR_COUNT],
    /// Average rating truncated to whole stars.
    pub rating_int: i32,
    pub primary_category: Option<&'a Category>,
    pub categories: Vec<&'a Category>,
    /// Active warehouses holding the product.
    pub warehouses: Vec<WarehouseStock>,
    /// Units across all warehouses, or the listing's own stock when no
    /// warehouse rows exist.
    pub total_stock: i32,
    pub total_weight_grams: i64,
    /// Rates that can ship one unit, cheapest first.
    pub shipping_options: Vec<ShippingOption>,
}

impl EnrichedProduct<'_> {
    /// Whether the listing shows a struck-through original price.
    #[must_use]
    pub const fn has_discount(&self) -> bool {
        self.discount > 0
    }

    /// Whether the product can currently be bought.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.product.is_service || self.total_stock > 0
    }

    /// Attach warehouse stock and shipping rates.
    ///
    /// Each rate is priced for one unit at the unit weight of the warehouse
    /// it ships from. Per-kilogram rates whose weight band excludes that
    /// weight are dropped, as are rates from warehouses not in `stock`.
    #[must_use]
    pub fn with_logistics(
        mut self,
        stock: Vec<WarehouseStock>,
        costs: &[ShippingCost],
        number_format: NumberFormat,
    ) -> Self {
        if !stock.is_empty() {
            let summary = StockSummary::of(&stock);
            self.total_stock = summary.total_stock;
            self.total_weight_grams = summary.total_weight_grams;
        }

        let mut priced: Vec<(Decimal, ShippingOption)> = costs
            .iter()
            .filter_map(|rate| {
                let origin = stock
                    .iter()
                    .find(|w| w.product_warehouse_id == rate.product_warehouse_id)?;
                if !rate.accepts_weight(origin.weight_kg) {
                    return None;
                }
                let cost = rate.cost_for(origin.weight_kg).round_dp(2);
                let is_free = self.product.free_shipping || cost.is_zero();
                let option = ShippingOption {
                    warehouse_name: origin.warehouse_name.clone(),
                    country: rate.country.clone(),
                    regions: describe_regions(&rate.locations),
                    formatted_cost: format_number(cost.to_f64().unwrap_or(0.0), number_format),
                    currency_id: rate.currency_id.clone(),
                    estimated_days: rate.estimated_days(),
                    is_free,
                };
                Some((if is_free { Decimal::ZERO } else { cost }, option))
            })
            .collect();
        priced.sort_by(|a, b| a.0.cmp(&b.0));

        self.shipping_options = priced.into_iter().map(|(_, option)| option).collect();
        self.warehouses = stock;
        self
    }
}

/// One way of shipping a unit, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingOption {
    pub warehouse_name: String,
    /// Destination country code.
    pub country: String,
    /// Destination states and cities, empty for the whole country.
    pub regions: String,
    pub formatted_cost: String,
    pub currency_id: String,
    pub estimated_days: Option<String>,
    pub is_free: bool,
}

/// `Jalisco (Guadalajara, Zapopan); Colima`
fn describe_regions(locations: &[ShippingLocation]) -> String {
    locations
        .iter()
        .filter_map(|l| match (l.state.as_deref(), l.cities.is_empty()) {
            (Some(state), true) => Some(state.to_owned()),
            (Some(state), false) => Some(format!("{state} ({})", l.cities.join(", "))),
            (None, false) => Some(l.cities.join(", ")),
            (None, true) => None,
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decorate `product` for display.
///
/// `links` may hold memberships of other products; only the ones for
/// `product` are used. Links to categories missing from `tree` are skipped.
/// The primary category is the link flagged primary, or else the first
/// resolvable one.
#[must_use]
pub fn enrich<'a>(
    product: Product,
    links: &[ProductCategory],
    tree: &'a CategoryTree,
    number_format: NumberFormat,
) -> EnrichedProduct<'a> {
    let own = || links.iter().filter(|l| l.product_id == product.id);

    let categories: Vec<&Category> = own().filter_map(|l| tree.get(&l.category_id)).collect();
    let primary_category = own()
        .filter(|l| l.is_primary)
        .find_map(|l| tree.get(&l.category_id))
        .or_else(|| categories.first().copied());

    let rating_int = product.rating.trunc().to_i32().unwrap_or(0);
    let stars = std::array::from_fn(|index| Star {
        index,
        filled: i32::try_from(index).is_ok_and(|i| i < rating_int),
    });

    #[allow(clippy::cast_precision_loss)]
    let (price, original_price) = (product.price as f64, product.original_price as f64);

    EnrichedProduct {
        formatted_price: format_number(price, number_format),
        formatted_original_price: format_number(original_price, number_format),
        discount: discount_percent(product.original_price, product.price),
        stars,
        rating_int,
        primary_category,
        categories,
        warehouses: Vec::new(),
        total_stock: product.stock,
        total_weight_grams: 0,
        shipping_options: Vec::new(),
        product,
    }
}

/// Enrich a batch of products sharing one membership lookup.
#[must_use]
pub fn enrich_all<'a>(
    products: Vec<Product>,
    links: &[ProductCategory],
    tree: &'a CategoryTree,
    number_format: NumberFormat,
) -> Vec<EnrichedProduct<'a>> {
    let mut by_product: HashMap<ProductId, Vec<ProductCategory>> = HashMap::new();
    for link in links {
        by_product.entry(link.product_id).or_default().push(link.clone());
    }

    products
        .into_iter()
        .map(|p| {
            let own = by_product.get(&p.id).map(Vec::as_slice).unwrap_or_default();
            enrich(p, own, tree, number_format)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::services::catalog::tests::product;
    use mercadillo_core::{ProductWarehouseId, ShippingCostId, ShippingPriceType, WarehouseId};

    const TREE: &str = r#"{
        "A": {"name": "Hogar", "children": {"A1": {"name": "Cocina"}}},
        "B": {"name": "Moda"}
    }"#;

    fn link(product: &Product, category_id: &str, is_primary: bool) -> ProductCategory {
        ProductCategory {
            product_id: product.id,
            category_id: category_id.to_owned(),
            is_primary,
        }
    }

    #[test]
    fn test_prices_and_discount() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let mut p = product(0);
        p.price = 1500;
        p.original_price = 2000;

        let view = enrich(p, &[], &tree, NumberFormat::Grouped);
        assert_eq!(view.formatted_price, "1.500");
        assert_eq!(view.formatted_original_price, "2.000");
        assert_eq!(view.discount, 25);
        assert!(view.has_discount());
        assert!(view.primary_category.is_none());
        assert!(view.categories.is_empty());
    }

    #[test]
    fn test_zero_original_price_has_no_discount() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let mut p = product(0);
        p.original_price = 0;

        let view = enrich(p, &[], &tree, NumberFormat::Grouped);
        assert_eq!(view.discount, 0);
        assert!(!view.has_discount());
    }

    #[test]
    fn test_stars_follow_truncated_rating() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let mut p = product(0);
        p.rating = Decimal::new(379, 2);

        let view = enrich(p, &[], &tree, NumberFormat::Grouped);
        assert_eq!(view.rating_int, 3);
        let filled: Vec<bool> = view.stars.iter().map(|s| s.filled).collect();
        assert_eq!(filled, vec![true, true, true, false, false]);
        assert_eq!(view.stars.last().unwrap().index, 4);
    }

    #[test]
    fn test_primary_flag_wins() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let p = product(0);
        let links = vec![link(&p, "B", false), link(&p, "A1", true)];

        let view = enrich(p, &links, &tree, NumberFormat::Grouped);
        assert_eq!(view.primary_category.unwrap().id, "A1");
        assert_eq!(view.categories.len(), 2);
    }

    #[test]
    fn test_first_resolvable_category_without_primary() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let p = product(0);
        let links = vec![link(&p, "GONE", true), link(&p, "B", false)];

        let view = enrich(p, &links, &tree, NumberFormat::Grouped);
        assert_eq!(view.primary_category.unwrap().id, "B");
        assert_eq!(view.categories.len(), 1);
    }

    #[test]
    fn test_enrich_all_keeps_links_apart() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let first = product(1);
        let second = product(2);
        let links = vec![link(&first, "A", true), link(&second, "B", true)];

        let views = enrich_all(vec![first, second], &links, &tree, NumberFormat::Plain);
        let primaries: Vec<&str> = views
            .iter()
            .map(|v| v.primary_category.unwrap().id.as_str())
            .collect();
        assert_eq!(primaries, vec!["A", "B"]);
    }

    fn warehouse(name: &str, quantity: i32, weight_kg: Decimal) -> WarehouseStock {
        WarehouseStock {
            product_warehouse_id: ProductWarehouseId::generate(),
            warehouse_id: WarehouseId::generate(),
            warehouse_name: name.to_owned(),
            country: "MX".to_owned(),
            state: "Jalisco".to_owned(),
            city: "Guadalajara".to_owned(),
            quantity,
            weight_kg,
        }
    }

    fn rate(from: &WarehouseStock, price_type: ShippingPriceType, cost: Decimal) -> ShippingCost {
        ShippingCost {
            id: ShippingCostId::generate(),
            product_warehouse_id: from.product_warehouse_id,
            country: "MX".to_owned(),
            locations: Vec::new(),
            cost,
            currency_id: "USD".to_owned(),
            price_type,
            min_weight_kg: None,
            max_weight_kg: None,
            estimated_days_min: Some(2),
            estimated_days_max: Some(4),
        }
    }

    #[test]
    fn test_listing_stock_without_warehouses() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let mut p = product(1);
        p.stock = 7;

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            Vec::new(),
            &[],
            NumberFormat::Grouped,
        );
        assert_eq!(view.total_stock, 7);
        assert_eq!(view.total_weight_grams, 0);
        assert!(view.shipping_options.is_empty());
        assert!(view.in_stock());
    }

    #[test]
    fn test_total_stock_sums_warehouses() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let mut p = product(1);
        p.stock = 0;
        let stock = vec![
            warehouse("Norte", 4, Decimal::new(2_500, 3)),
            warehouse("Sur", 6, Decimal::new(500, 3)),
        ];

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            stock,
            &[],
            NumberFormat::Grouped,
        );
        assert_eq!(view.total_stock, 10);
        assert_eq!(view.total_weight_grams, 13_000);
        assert_eq!(view.warehouses.len(), 2);
        assert!(view.in_stock());
    }

    #[test]
    fn test_empty_warehouses_mean_out_of_stock() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let p = product(1);
        let stock = vec![warehouse("Norte", 0, Decimal::ONE)];

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            stock,
            &[],
            NumberFormat::Grouped,
        );
        assert_eq!(view.total_stock, 0);
        assert!(!view.in_stock());
    }

    #[test]
    fn test_shipping_options_priced_per_unit_and_sorted() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        // odd n: no free shipping flag
        let p = product(1);
        let heavy = warehouse("Norte", 2, Decimal::new(3_000, 3));
        let light = warehouse("Sur", 2, Decimal::new(1_500, 3));
        let costs = vec![
            rate(&heavy, ShippingPriceType::Fixed, Decimal::from(1_200)),
            rate(&light, ShippingPriceType::PerKg, Decimal::from(300)),
            rate(&heavy, ShippingPriceType::PerKg, Decimal::from(500)),
        ];

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            vec![heavy, light],
            &costs,
            NumberFormat::Grouped,
        );
        let summary: Vec<(&str, &str)> = view
            .shipping_options
            .iter()
            .map(|o| (o.warehouse_name.as_str(), o.formatted_cost.as_str()))
            .collect();
        // 300 * 1.5 kg, fixed 1200, 500 * 3 kg
        assert_eq!(summary, vec![("Sur", "450"), ("Norte", "1.200"), ("Norte", "1.500")]);
        assert!(view.shipping_options.iter().all(|o| !o.is_free));
        assert_eq!(view.shipping_options[0].estimated_days.as_deref(), Some("2-4"));
    }

    #[test]
    fn test_shipping_options_skip_out_of_band_and_unknown_warehouses() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        let p = product(1);
        let stocked = warehouse("Norte", 1, Decimal::from(12));
        let elsewhere = warehouse("Otro", 1, Decimal::ONE);

        let mut banded = rate(&stocked, ShippingPriceType::PerKg, Decimal::from(10));
        banded.max_weight_kg = Some(Decimal::from(10));
        let costs = vec![
            banded,
            rate(&elsewhere, ShippingPriceType::Fixed, Decimal::from(99)),
            rate(&stocked, ShippingPriceType::Fixed, Decimal::from(80)),
        ];

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            vec![stocked],
            &costs,
            NumberFormat::Grouped,
        );
        assert_eq!(view.shipping_options.len(), 1);
        assert_eq!(view.shipping_options[0].formatted_cost, "80");
    }

    #[test]
    fn test_free_shipping_listing_sorts_first() {
        let tree = CategoryTree::from_json(TREE).unwrap();
        // even n: free shipping flag set
        let p = product(2);
        let stocked = warehouse("Norte", 1, Decimal::ONE);
        let mut regional = rate(&stocked, ShippingPriceType::Fixed, Decimal::from(50));
        regional.locations = vec![
            ShippingLocation {
                state: Some("Jalisco".to_owned()),
                cities: vec!["Guadalajara".to_owned(), "Zapopan".to_owned()],
            },
            ShippingLocation {
                state: Some("Colima".to_owned()),
                cities: Vec::new(),
            },
        ];

        let view = enrich(p, &[], &tree, NumberFormat::Grouped).with_logistics(
            vec![stocked],
            &[regional],
            NumberFormat::Grouped,
        );
        let option = &view.shipping_options[0];
        assert!(option.is_free);
        assert_eq!(option.regions, "Jalisco (Guadalajara, Zapopan); Colima");
    }
}
