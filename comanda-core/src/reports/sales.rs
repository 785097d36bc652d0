//! Sales report aggregation

use super::{day_key, month_key, week_key};
use crate::orders::pricing::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{GroupBy, Order, SalesBucket, SalesReport};
use std::collections::BTreeMap;

fn bucket_key(order: &Order, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Day => day_key(&order.created_at),
        GroupBy::Week => week_key(&order.created_at),
        GroupBy::Month => month_key(&order.created_at),
    }
}

/// Aggregate a loaded range into a sales report
///
/// Canceled orders appear in `sales_by_status` only; every monetary figure
/// and the order count ignore them.
pub fn build_sales_report(orders: &[Order], group_by: GroupBy) -> SalesReport {
    let mut by_date: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    let mut by_payment: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    let mut count: i64 = 0;

    for order in orders {
        *by_status.entry(order.status.as_str().to_string()).or_insert(0) += 1;
        if order.status.is_canceled() {
            continue;
        }

        let amount = to_decimal(order.total);
        let bucket = by_date.entry(bucket_key(order, group_by)).or_insert((Decimal::ZERO, 0));
        bucket.0 += amount;
        bucket.1 += 1;

        *by_payment
            .entry(order.payment_method.clone())
            .or_insert(Decimal::ZERO) += amount;

        total += amount;
        count += 1;
    }

    let average_ticket = if count > 0 {
        to_f64(total / Decimal::from(count))
    } else {
        0.0
    };

    SalesReport {
        sales_by_date: by_date
            .into_iter()
            .map(|(key, (sum, orders))| {
                (
                    key,
                    SalesBucket {
                        total: to_f64(sum),
                        orders,
                    },
                )
            })
            .collect(),
        sales_by_payment_method: by_payment
            .into_iter()
            .map(|(key, sum)| (key, to_f64(sum)))
            .collect(),
        sales_by_status: by_status,
        total_sales: to_f64(total),
        order_count: count,
        average_ticket,
    }
}
