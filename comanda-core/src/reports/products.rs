//! Top products aggregation

use crate::orders::pricing::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{Order, ProductSales, TopProductsReport};
use std::collections::HashMap;

/// Best sellers by quantity across the non-canceled orders
///
/// Revenue is quantity × plain unit price by contract; additionals are left
/// out even though they affect the order totals.
pub fn build_top_products(orders: &[Order], limit: usize) -> TopProductsReport {
    let mut by_product: HashMap<String, (String, i64, Decimal)> = HashMap::new();

    for order in orders.iter().filter(|o| !o.status.is_canceled()) {
        for item in &order.items {
            let entry = by_product
                .entry(item.product_id.clone())
                .or_insert_with(|| (item.product_name.clone(), 0, Decimal::ZERO));
            entry.1 += item.quantity;
            entry.2 += to_decimal(item.unit_price) * Decimal::from(item.quantity);
        }
    }

    let mut products: Vec<ProductSales> = by_product
        .into_iter()
        .map(|(product_id, (product_name, quantity, revenue))| ProductSales {
            product_id,
            product_name,
            quantity,
            revenue: to_f64(revenue),
        })
        .collect();

    // quantity desc; name keeps ties deterministic
    products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    let total_quantity = products.iter().map(|p| p.quantity).sum();
    let total_revenue = to_f64(products.iter().map(|p| to_decimal(p.revenue)).sum());
    products.truncate(limit);

    TopProductsReport {
        products,
        total_quantity,
        total_revenue,
    }
}
