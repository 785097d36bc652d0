//! Reporting model
//!
//! Response shapes for the back-office reports. Aggregation lives in the
//! service crate; these types only carry the results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucketing granularity for sales reports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    /// Buckets keyed by the preceding Sunday
    Week,
    Month,
}

/// Totals for one sales bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    pub total: f64,
    pub orders: i64,
}

/// Sales report over a date range
///
/// Canceled orders are counted in `sales_by_status` but excluded from every
/// monetary aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub sales_by_date: BTreeMap<String, SalesBucket>,
    pub sales_by_payment_method: BTreeMap<String, f64>,
    pub sales_by_status: BTreeMap<String, i64>,
    pub total_sales: f64,
    pub order_count: i64,
    pub average_ticket: f64,
}

/// Per-product sales line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// unit price × quantity; additionals excluded
    pub revenue: f64,
}

/// Top products report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductsReport {
    pub products: Vec<ProductSales>,
    /// Quantity across every product in range, not just the listed ones
    pub total_quantity: i64,
    pub total_revenue: f64,
}

/// Direction of change against the previous period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Comparison against the immediately preceding period of equal duration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub previous_total: f64,
    pub percentage_from_previous_period: f64,
    pub trend: Trend,
}

/// Revenue of one weekday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySales {
    /// Portuguese weekday name, Sunday first
    pub weekday: String,
    pub total: f64,
}

/// Revenue report over a date range
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total: f64,
    pub by_date: BTreeMap<String, f64>,
    pub by_weekday: Vec<WeekdaySales>,
    pub by_month: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<PeriodComparison>,
}

/// Average ticket of the period against the previous one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AverageTicketComparison {
    pub current: f64,
    pub previous: f64,
    pub percentage: f64,
    pub trend: Trend,
}

/// Preset trailing windows for performance dashboards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PerformancePeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl PerformancePeriod {
    /// Length of the trailing window in days
    pub const fn days(&self) -> i64 {
        match self {
            PerformancePeriod::Daily => 1,
            PerformancePeriod::Weekly => 7,
            PerformancePeriod::Monthly => 30,
            PerformancePeriod::Yearly => 365,
        }
    }
}

/// Performance snapshot for one preset window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub period: PerformancePeriod,
    pub total_sales: f64,
    pub order_count: i64,
    pub average_ticket: f64,
    /// Revenue against the preceding window
    pub comparison: PeriodComparison,
    /// Order count against the preceding window; `previous_total` carries
    /// the previous count
    pub order_count_comparison: PeriodComparison,
    pub average_ticket_comparison: AverageTicketComparison,
    /// Five best sellers of the current window
    pub top_products: Vec<ProductSales>,
    pub sales_by_weekday: Vec<WeekdaySales>,
}
