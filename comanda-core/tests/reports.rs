//! Reporting services against an in-memory database seeded with backdated
//! orders through the repository layer.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use comanda_core::db::repository::order as order_repo;
use comanda_core::{CoreConfig, DbService, ReportService};
use shared::models::{
    DeliveryType, GroupBy, Order, OrderItem, OrderStatus, PerformancePeriod, Trend,
};
use sqlx::sqlite::SqlitePoolOptions;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn config() -> CoreConfig {
    CoreConfig {
        database_path: ":memory:".into(),
        report_query_cap: 100_000,
        customer_active_window_days: 60,
    }
}

fn seeded(
    id: &str,
    total: f64,
    status: OrderStatus,
    payment: &str,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: id.into(),
        number: created_at.timestamp().to_string(),
        customer_name: "Maria Silva".into(),
        customer_phone: "11988887777".into(),
        customer_address: None,
        establishment_id: "est-1".into(),
        items: vec![OrderItem {
            id: format!("{id}-i1"),
            product_id: "p-burger".into(),
            product_name: "X-Burger".into(),
            quantity: 1,
            unit_price: total,
            total_price: total,
            notes: None,
            additionals: Vec::new(),
        }],
        status,
        delivery_type: DeliveryType::Pickup,
        delivery_fee: 0.0,
        subtotal: total,
        total,
        payment_method: payment.into(),
        change: None,
        notes: None,
        created_at,
        updated_at: created_at,
        status_history: Vec::new(),
    }
}

async fn setup() -> Result<(ReportService, DbService)> {
    init_tracing();
    let db = DbService::new_in_memory().await?;
    let reports = ReportService::new(&db, &config());
    Ok((reports, db))
}

#[tokio::test]
async fn test_sales_report_over_stored_orders() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();

    order_repo::create(&db.pool, &seeded("o-1", 40.0, OrderStatus::Delivered, "pix", now)).await?;
    order_repo::create(&db.pool, &seeded("o-2", 60.0, OrderStatus::Confirmed, "pix", now)).await?;
    order_repo::create(&db.pool, &seeded("o-3", 99.0, OrderStatus::Canceled, "cash", now)).await?;

    let report = reports
        .sales_report("est-1", now - Duration::days(1), now, GroupBy::Day)
        .await?;

    assert_eq!(report.total_sales, 100.0);
    assert_eq!(report.order_count, 2);
    assert_eq!(report.average_ticket, 50.0);
    assert_eq!(report.sales_by_status["CANCELED"], 1);
    assert_eq!(report.sales_by_payment_method["pix"], 100.0);
    assert!(!report.sales_by_payment_method.contains_key("cash"));
    Ok(())
}

#[tokio::test]
async fn test_range_bounds_scope_the_report() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();

    order_repo::create(
        &db.pool,
        &seeded("inside", 50.0, OrderStatus::Delivered, "pix", now - Duration::days(2)),
    )
    .await?;
    order_repo::create(
        &db.pool,
        &seeded("outside", 80.0, OrderStatus::Delivered, "pix", now - Duration::days(30)),
    )
    .await?;

    let report = reports
        .sales_report("est-1", now - Duration::days(7), now, GroupBy::Day)
        .await?;
    assert_eq!(report.total_sales, 50.0);
    assert_eq!(report.order_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_top_products_from_storage() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();

    order_repo::create(&db.pool, &seeded("o-1", 15.0, OrderStatus::Delivered, "pix", now)).await?;
    order_repo::create(&db.pool, &seeded("o-2", 15.0, OrderStatus::Confirmed, "pix", now)).await?;

    let report = reports
        .top_products("est-1", now - Duration::days(1), now, 10)
        .await?;

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.products[0].product_id, "p-burger");
    assert_eq!(report.products[0].quantity, 2);
    assert_eq!(report.total_revenue, 30.0);
    Ok(())
}

#[tokio::test]
async fn test_revenue_comparison_against_previous_period() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();
    let start = now - Duration::days(7);

    // current week: 1000; preceding week: 500
    order_repo::create(
        &db.pool,
        &seeded("cur", 1000.0, OrderStatus::Delivered, "pix", now - Duration::days(2)),
    )
    .await?;
    order_repo::create(
        &db.pool,
        &seeded("prev", 500.0, OrderStatus::Delivered, "pix", now - Duration::days(9)),
    )
    .await?;

    let report = reports.revenue_report("est-1", start, now, true).await?;
    assert_eq!(report.total, 1000.0);
    let comparison = report.comparison.unwrap();
    assert_eq!(comparison.previous_total, 500.0);
    assert_eq!(comparison.percentage_from_previous_period, 100.0);
    assert_eq!(comparison.trend, Trend::Up);

    // without comparison the previous period is never loaded
    let report = reports.revenue_report("est-1", start, now, false).await?;
    assert!(report.comparison.is_none());
    Ok(())
}

#[tokio::test]
async fn test_average_ticket_comparison() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();
    let start = now - Duration::days(7);

    order_repo::create(
        &db.pool,
        &seeded("c-1", 60.0, OrderStatus::Delivered, "pix", now - Duration::days(1)),
    )
    .await?;
    order_repo::create(
        &db.pool,
        &seeded("c-2", 40.0, OrderStatus::Delivered, "pix", now - Duration::days(2)),
    )
    .await?;
    order_repo::create(
        &db.pool,
        &seeded("p-1", 100.0, OrderStatus::Delivered, "pix", now - Duration::days(8)),
    )
    .await?;

    let comparison = reports.average_ticket("est-1", start, now).await?;
    assert_eq!(comparison.current, 50.0);
    assert_eq!(comparison.previous, 100.0);
    assert_eq!(comparison.percentage, -50.0);
    assert_eq!(comparison.trend, Trend::Down);
    Ok(())
}

#[tokio::test]
async fn test_performance_presets_use_trailing_windows() -> Result<()> {
    let (reports, db) = setup().await?;
    let now = Utc::now();

    // inside the trailing week, and inside the week before it
    order_repo::create(
        &db.pool,
        &seeded("cur", 1000.0, OrderStatus::Delivered, "pix", now - Duration::days(3)),
    )
    .await?;
    order_repo::create(
        &db.pool,
        &seeded("prev", 500.0, OrderStatus::Delivered, "pix", now - Duration::days(10)),
    )
    .await?;

    let stats = reports
        .performance_stats_at("est-1", PerformancePeriod::Weekly, now)
        .await?;

    assert_eq!(stats.period, PerformancePeriod::Weekly);
    assert_eq!(stats.total_sales, 1000.0);
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.comparison.previous_total, 500.0);
    assert_eq!(stats.comparison.percentage_from_previous_period, 100.0);
    assert_eq!(stats.comparison.trend, Trend::Up);

    // one order on each side: counts are stable, the ticket doubled
    assert_eq!(stats.order_count_comparison.previous_total, 1.0);
    assert_eq!(stats.order_count_comparison.percentage_from_previous_period, 0.0);
    assert_eq!(stats.order_count_comparison.trend, Trend::Stable);
    assert_eq!(stats.average_ticket_comparison.current, 1000.0);
    assert_eq!(stats.average_ticket_comparison.previous, 500.0);
    assert_eq!(stats.average_ticket_comparison.percentage, 100.0);
    assert_eq!(stats.average_ticket_comparison.trend, Trend::Up);

    assert_eq!(stats.top_products[0].product_id, "p-burger");
    assert_eq!(stats.sales_by_weekday.len(), 7);

    // the daily window misses both seeds on the current side
    let stats = reports
        .performance_stats_at("est-1", PerformancePeriod::Daily, now)
        .await?;
    assert_eq!(stats.total_sales, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_empty_range_produces_zeroed_reports() -> Result<()> {
    let (reports, _db) = setup().await?;
    let now = Utc::now();

    let sales = reports
        .sales_report("est-1", now - Duration::days(7), now, GroupBy::Day)
        .await?;
    assert_eq!(sales.total_sales, 0.0);
    assert_eq!(sales.order_count, 0);
    assert_eq!(sales.average_ticket, 0.0);

    let comparison = reports.average_ticket("est-1", now - Duration::days(7), now).await?;
    assert_eq!(comparison.current, 0.0);
    assert_eq!(comparison.trend, Trend::Stable);
    Ok(())
}

#[tokio::test]
async fn test_reports_survive_an_unmigrated_database() -> Result<()> {
    init_tracing();
    // raw pool, no migrations: every table is missing
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = DbService { pool };
    let reports = ReportService::new(&db, &config());

    let now = Utc::now();
    let sales = reports
        .sales_report("est-1", now - Duration::days(7), now, GroupBy::Day)
        .await?;
    assert_eq!(sales.total_sales, 0.0);
    assert!(sales.sales_by_date.is_empty());

    let top = reports.top_products("est-1", now - Duration::days(7), now, 5).await?;
    assert!(top.products.is_empty());
    Ok(())
}
