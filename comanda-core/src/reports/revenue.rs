//! Revenue report aggregation and period comparisons

use super::{WEEKDAYS_PT, day_key, month_key, total_revenue, weekday_index};
use crate::orders::pricing::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{
    AverageTicketComparison, Order, PeriodComparison, RevenueReport, Trend, WeekdaySales,
};
use std::collections::BTreeMap;

/// Percentage change of `current` against `previous` with its direction
///
/// A previous period of zero with any current revenue reads as +100% growth;
/// two zero periods read as stable.
pub(crate) fn percentage_change(current: f64, previous: f64) -> (f64, Trend) {
    if previous > 0.0 {
        let pct = to_f64(
            (to_decimal(current) - to_decimal(previous)) / to_decimal(previous)
                * Decimal::ONE_HUNDRED,
        );
        let trend = if pct > 0.0 {
            Trend::Up
        } else if pct < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        };
        (pct, trend)
    } else if current > 0.0 {
        (100.0, Trend::Up)
    } else {
        (0.0, Trend::Stable)
    }
}

/// Comparison block against the preceding period
pub fn compare_periods(current: f64, previous: f64) -> PeriodComparison {
    let (percentage, trend) = percentage_change(current, previous);
    PeriodComparison {
        previous_total: previous,
        percentage_from_previous_period: percentage,
        trend,
    }
}

/// Revenue per weekday, Sunday first, Portuguese names; always 7 entries
pub fn weekday_sales(orders: &[Order]) -> Vec<WeekdaySales> {
    let mut totals = [Decimal::ZERO; 7];
    for order in orders.iter().filter(|o| !o.status.is_canceled()) {
        totals[weekday_index(&order.created_at)] += to_decimal(order.total);
    }
    WEEKDAYS_PT
        .iter()
        .zip(totals)
        .map(|(weekday, total)| WeekdaySales {
            weekday: (*weekday).to_string(),
            total: to_f64(total),
        })
        .collect()
}

/// Aggregate a loaded range into a revenue report
pub fn build_revenue_report(orders: &[Order], previous_total: Option<f64>) -> RevenueReport {
    let mut by_date: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();

    for order in orders.iter().filter(|o| !o.status.is_canceled()) {
        let amount = to_decimal(order.total);
        *by_date.entry(day_key(&order.created_at)).or_insert(Decimal::ZERO) += amount;
        *by_month.entry(month_key(&order.created_at)).or_insert(Decimal::ZERO) += amount;
    }

    let total = to_f64(total_revenue(orders));

    RevenueReport {
        total,
        by_date: by_date.into_iter().map(|(k, v)| (k, to_f64(v))).collect(),
        by_weekday: weekday_sales(orders),
        by_month: by_month.into_iter().map(|(k, v)| (k, to_f64(v))).collect(),
        comparison: previous_total.map(|previous| compare_periods(total, previous)),
    }
}

/// Average ticket comparison between two loaded ranges
pub fn build_average_ticket(current: &[Order], previous: &[Order]) -> AverageTicketComparison {
    let ticket = |orders: &[Order]| -> f64 {
        let count = orders.iter().filter(|o| !o.status.is_canceled()).count();
        if count == 0 {
            return 0.0;
        }
        to_f64(total_revenue(orders) / Decimal::from(count as i64))
    };

    let current_ticket = ticket(current);
    let previous_ticket = ticket(previous);
    let (percentage, trend) = percentage_change(current_ticket, previous_ticket);

    AverageTicketComparison {
        current: current_ticket,
        previous: previous_ticket,
        percentage,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use shared::models::{DeliveryType, OrderStatus};

    fn order(total: f64, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: format!("o-{total}"),
            number: "1756100000".into(),
            customer_name: "Maria".into(),
            customer_phone: "11999990000".into(),
            customer_address: None,
            establishment_id: "est-1".into(),
            items: Vec::new(),
            status,
            delivery_type: DeliveryType::Delivery,
            delivery_fee: 0.0,
            subtotal: total,
            total,
            payment_method: "pix".into(),
            change: None,
            notes: None,
            created_at,
            updated_at: created_at,
            status_history: Vec::new(),
        }
    }

    #[test]
    fn test_growth_percentage() {
        // 500 -> 1000 is +100% growth
        let comparison = compare_periods(1000.0, 500.0);
        assert_eq!(comparison.previous_total, 500.0);
        assert_eq!(comparison.percentage_from_previous_period, 100.0);
        assert_eq!(comparison.trend, Trend::Up);
    }

    #[test]
    fn test_decline_percentage() {
        let comparison = compare_periods(250.0, 500.0);
        assert_eq!(comparison.percentage_from_previous_period, -50.0);
        assert_eq!(comparison.trend, Trend::Down);
    }

    #[test]
    fn test_zero_previous_with_revenue_reads_plus_hundred() {
        let comparison = compare_periods(200.0, 0.0);
        assert_eq!(comparison.percentage_from_previous_period, 100.0);
        assert_eq!(comparison.trend, Trend::Up);
    }

    #[test]
    fn test_two_zero_periods_read_stable() {
        let comparison = compare_periods(0.0, 0.0);
        assert_eq!(comparison.percentage_from_previous_period, 0.0);
        assert_eq!(comparison.trend, Trend::Stable);
    }

    #[test]
    fn test_equal_periods_read_stable() {
        let comparison = compare_periods(500.0, 500.0);
        assert_eq!(comparison.percentage_from_previous_period, 0.0);
        assert_eq!(comparison.trend, Trend::Stable);
    }

    #[test]
    fn test_weekday_histogram_sunday_first() {
        let sunday = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
        let orders = vec![
            order(10.0, OrderStatus::Delivered, sunday),
            order(20.0, OrderStatus::Delivered, monday),
            order(99.0, OrderStatus::Canceled, monday),
        ];

        let by_weekday = weekday_sales(&orders);
        assert_eq!(by_weekday.len(), 7);
        assert_eq!(by_weekday[0].weekday, "Domingo");
        assert_eq!(by_weekday[0].total, 10.0);
        assert_eq!(by_weekday[1].weekday, "Segunda-feira");
        assert_eq!(by_weekday[1].total, 20.0);
        assert_eq!(by_weekday[6].weekday, "Sábado");
        assert_eq!(by_weekday[6].total, 0.0);
    }

    #[test]
    fn test_revenue_report_buckets() {
        let d1 = Utc.with_ymd_and_hms(2025, 7, 31, 12, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let orders = vec![
            order(10.0, OrderStatus::Delivered, d1),
            order(20.0, OrderStatus::Delivered, d2),
            order(40.0, OrderStatus::Canceled, d2),
        ];

        let report = build_revenue_report(&orders, Some(15.0));
        assert_eq!(report.total, 30.0);
        assert_eq!(report.by_date["2025-07-31"], 10.0);
        assert_eq!(report.by_date["2025-08-01"], 20.0);
        assert_eq!(report.by_month["2025-07"], 10.0);
        assert_eq!(report.by_month["2025-08"], 20.0);
        assert_eq!(report.comparison.unwrap().percentage_from_previous_period, 100.0);
    }

    #[test]
    fn test_average_ticket_zero_safe() {
        let comparison = build_average_ticket(&[], &[]);
        assert_eq!(comparison.current, 0.0);
        assert_eq!(comparison.previous, 0.0);
        assert_eq!(comparison.trend, Trend::Stable);
    }

    #[test]
    fn test_average_ticket_excludes_canceled() {
        let now = Utc::now();
        let current = vec![
            order(100.0, OrderStatus::Delivered, now),
            order(50.0, OrderStatus::Confirmed, now),
            order(999.0, OrderStatus::Canceled, now),
        ];
        let comparison = build_average_ticket(&current, &[]);
        assert_eq!(comparison.current, 75.0);
    }
}
