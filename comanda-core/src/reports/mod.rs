//! Reporting aggregator
//!
//! Reports load the date range once (capped) and aggregate in memory; the
//! pure builders live in the submodules so they can be tested without a
//! database. Canceled orders never count towards monetary aggregates.

pub mod products;
pub mod revenue;
pub mod sales;

use crate::config::CoreConfig;
use crate::db::DbService;
use crate::db::repository::order as order_repo;
use crate::orders::pricing::{to_decimal, to_f64};
use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use shared::error::AppResult;
use shared::models::{
    AverageTicketComparison, GroupBy, Order, PerformancePeriod, PerformanceStats, RevenueReport,
    SalesReport, TopProductsReport,
};
use shared::AppError;
use sqlx::SqlitePool;

/// Portuguese weekday names, Sunday first
pub(crate) const WEEKDAYS_PT: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

/// Day bucket key: YYYY-MM-DD
pub(crate) fn day_key(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Week bucket key: the preceding (or same) Sunday as YYYY-MM-DD
pub(crate) fn week_key(ts: &DateTime<Utc>) -> String {
    let date = ts.date_naive();
    let sunday = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    sunday.format("%Y-%m-%d").to_string()
}

/// Month bucket key: YYYY-MM
pub(crate) fn month_key(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

/// Sunday-first weekday index, 0..=6
pub(crate) fn weekday_index(ts: &DateTime<Utc>) -> usize {
    ts.weekday().num_days_from_sunday() as usize
}

/// Revenue of the non-canceled orders
pub(crate) fn total_revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| !o.status.is_canceled())
        .map(|o| to_decimal(o.total))
        .sum()
}

/// Back-office reporting service
#[derive(Clone)]
pub struct ReportService {
    pool: SqlitePool,
    query_cap: i64,
}

impl ReportService {
    pub fn new(db: &DbService, config: &CoreConfig) -> Self {
        Self {
            pool: db.pool.clone(),
            query_cap: config.report_query_cap,
        }
    }

    async fn load_range(
        &self,
        establishment_id: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        if establishment_id.trim().is_empty() {
            return Err(AppError::required_field("establishmentId"));
        }
        let orders =
            order_repo::find_in_range(&self.pool, establishment_id, start, end, self.query_cap)
                .await?;
        tracing::debug!(
            establishment_id,
            start = %start,
            end = %end,
            orders = orders.len(),
            "loaded report range"
        );
        Ok(orders)
    }

    /// Immediately preceding period of equal duration
    fn previous_range(
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let span = *end - *start;
        // nudge the boundary so an order exactly at `start` counts once
        (*start - span, *start - Duration::microseconds(1))
    }

    /// Sales totals bucketed by `group_by`, payment method, and status
    pub async fn sales_report(
        &self,
        establishment_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: GroupBy,
    ) -> AppResult<SalesReport> {
        let orders = self.load_range(establishment_id, &start, &end).await?;
        Ok(sales::build_sales_report(&orders, group_by))
    }

    /// Best sellers by quantity, with revenue at plain unit price
    pub async fn top_products(
        &self,
        establishment_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<TopProductsReport> {
        let orders = self.load_range(establishment_id, &start, &end).await?;
        Ok(products::build_top_products(&orders, limit))
    }

    /// Revenue buckets plus an optional previous-period comparison
    pub async fn revenue_report(
        &self,
        establishment_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        compare: bool,
    ) -> AppResult<RevenueReport> {
        let orders = self.load_range(establishment_id, &start, &end).await?;

        let previous_total = if compare {
            let (prev_start, prev_end) = Self::previous_range(&start, &end);
            let previous = self.load_range(establishment_id, &prev_start, &prev_end).await?;
            Some(to_f64(total_revenue(&previous)))
        } else {
            None
        };

        Ok(revenue::build_revenue_report(&orders, previous_total))
    }

    /// Average ticket of the range against the preceding period
    pub async fn average_ticket(
        &self,
        establishment_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<AverageTicketComparison> {
        let current = self.load_range(establishment_id, &start, &end).await?;
        let (prev_start, prev_end) = Self::previous_range(&start, &end);
        let previous = self.load_range(establishment_id, &prev_start, &prev_end).await?;

        Ok(revenue::build_average_ticket(&current, &previous))
    }

    /// Performance snapshot for a preset trailing window ending now
    pub async fn performance_stats(
        &self,
        establishment_id: &str,
        period: PerformancePeriod,
    ) -> AppResult<PerformanceStats> {
        self.performance_stats_at(establishment_id, period, Utc::now())
            .await
    }

    /// Performance snapshot for a preset trailing window ending at `now`
    pub async fn performance_stats_at(
        &self,
        establishment_id: &str,
        period: PerformancePeriod,
        now: DateTime<Utc>,
    ) -> AppResult<PerformanceStats> {
        let start = now - Duration::days(period.days());
        let current = self.load_range(establishment_id, &start, &now).await?;
        let (prev_start, prev_end) = Self::previous_range(&start, &now);
        let previous = self.load_range(establishment_id, &prev_start, &prev_end).await?;

        let sales = sales::build_sales_report(&current, GroupBy::Day);
        let previous_sales = sales::build_sales_report(&previous, GroupBy::Day);
        let current_total = to_f64(total_revenue(&current));
        let previous_total = to_f64(total_revenue(&previous));
        let top = products::build_top_products(&current, 5);
        let by_weekday = revenue::weekday_sales(&current);

        Ok(PerformanceStats {
            period,
            total_sales: current_total,
            order_count: sales.order_count,
            average_ticket: sales.average_ticket,
            comparison: revenue::compare_periods(current_total, previous_total),
            order_count_comparison: revenue::compare_periods(
                sales.order_count as f64,
                previous_sales.order_count as f64,
            ),
            average_ticket_comparison: revenue::build_average_ticket(&current, &previous),
            top_products: top.products,
            sales_by_weekday: by_weekday,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_and_month_keys() {
        let ts = Utc.with_ymd_and_hms(2025, 8, 25, 23, 59, 0).unwrap();
        assert_eq!(day_key(&ts), "2025-08-25");
        assert_eq!(month_key(&ts), "2025-08");
    }

    #[test]
    fn test_week_key_is_preceding_sunday() {
        // 2025-08-25 is a Monday; its week bucket is Sunday the 24th
        let monday = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(week_key(&monday), "2025-08-24");

        // Sundays bucket to themselves
        let sunday = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
        assert_eq!(week_key(&sunday), "2025-08-24");

        let saturday = Utc.with_ymd_and_hms(2025, 8, 30, 12, 0, 0).unwrap();
        assert_eq!(week_key(&saturday), "2025-08-24");
    }

    #[test]
    fn test_weekday_index_is_sunday_first() {
        let sunday = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
        assert_eq!(weekday_index(&sunday), 0);
        let saturday = Utc.with_ymd_and_hms(2025, 8, 30, 12, 0, 0).unwrap();
        assert_eq!(weekday_index(&saturday), 6);
    }
}
