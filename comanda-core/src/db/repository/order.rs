//! Order repository
//!
//! Orders are stored as one row per document; the `items` and
//! `status_history` collections live in JSON columns. Every query is scoped
//! by `establishment_id`.

use super::{RepoError, RepoResult, format_ts, is_missing_table, parse_ts};
use chrono::{DateTime, Utc};
use shared::models::{DeliveryType, Order, OrderItem, OrderStatus, StatusHistoryItem};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, number, customer_name, customer_phone, customer_address, \
     establishment_id, items, status, delivery_type, delivery_fee, subtotal, total, \
     payment_method, change, notes, status_history, created_at, updated_at FROM orders";

/// Raw order row; JSON columns decode in [`Order`] conversion
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    number: String,
    customer_name: String,
    customer_phone: String,
    customer_address: Option<String>,
    establishment_id: String,
    items: String,
    status: String,
    delivery_type: String,
    delivery_fee: f64,
    subtotal: f64,
    total: f64,
    payment_method: String,
    change: Option<f64>,
    notes: Option<String>,
    status_history: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> RepoResult<Order> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items)
            .map_err(|e| RepoError::Database(format!("Corrupt order items: {e}")))?;
        let status_history: Vec<StatusHistoryItem> = serde_json::from_str(&row.status_history)
            .map_err(|e| RepoError::Database(format!("Corrupt status history: {e}")))?;
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| RepoError::Database(format!("Corrupt order status: {}", row.status)))?;
        let delivery_type = DeliveryType::parse(&row.delivery_type).ok_or_else(|| {
            RepoError::Database(format!("Corrupt delivery type: {}", row.delivery_type))
        })?;

        Ok(Order {
            id: row.id,
            number: row.number,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            establishment_id: row.establishment_id,
            items,
            status,
            delivery_type,
            delivery_fee: row.delivery_fee,
            subtotal: row.subtotal,
            total: row.total,
            payment_method: row.payment_method,
            change: row.change,
            notes: row.notes,
            status_history,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

/// Filter for order listings; `establishment_id` is mandatory, everything
/// else narrows the result
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub establishment_id: String,
    /// Empty matches every status; multiple values are OR-ed
    pub statuses: Vec<OrderStatus>,
    /// Inclusive lower bound on `created_at`
    pub date_start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub date_end: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    /// Substring match over customer name and phone
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderListFilter {
    /// WHERE clause plus positional string binds, shared by the page and
    /// count queries
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut conditions = vec!["establishment_id = ?".to_string()];
        let mut binds = vec![self.establishment_id.clone()];

        if !self.statuses.is_empty() {
            let placeholders = vec!["?"; self.statuses.len()].join(", ");
            conditions.push(format!("status IN ({placeholders})"));
            binds.extend(self.statuses.iter().map(|s| s.as_str().to_string()));
        }
        if let Some(start) = &self.date_start {
            conditions.push("created_at >= ?".to_string());
            binds.push(format_ts(start));
        }
        if let Some(end) = &self.date_end {
            conditions.push("created_at <= ?".to_string());
            binds.push(format_ts(end));
        }
        if let Some(method) = &self.payment_method {
            conditions.push("payment_method = ?".to_string());
            binds.push(method.clone());
        }
        if let Some(term) = &self.search {
            conditions.push("(customer_name LIKE ? OR customer_phone LIKE ?)".to_string());
            let pattern = format!("%{term}%");
            binds.push(pattern.clone());
            binds.push(pattern);
        }

        (conditions.join(" AND "), binds)
    }
}

pub async fn create(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    let items = serde_json::to_string(&order.items)
        .map_err(|e| RepoError::Database(format!("Failed to encode order items: {e}")))?;
    let history = serde_json::to_string(&order.status_history)
        .map_err(|e| RepoError::Database(format!("Failed to encode status history: {e}")))?;

    sqlx::query(
        "INSERT INTO orders (id, number, customer_name, customer_phone, customer_address, \
         establishment_id, items, status, delivery_type, delivery_fee, subtotal, total, \
         payment_method, change, notes, status_history, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(&order.number)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.customer_address)
    .bind(&order.establishment_id)
    .bind(items)
    .bind(order.status.as_str())
    .bind(order.delivery_type.as_str())
    .bind(order.delivery_fee)
    .bind(order.subtotal)
    .bind(order.total)
    .bind(&order.payment_method)
    .bind(order.change)
    .bind(&order.notes)
    .bind(history)
    .bind(format_ts(&order.created_at))
    .bind(format_ts(&order.updated_at))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_id(
    pool: &SqlitePool,
    establishment_id: &str,
    id: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE establishment_id = ? AND id = ?");
    let row = match sqlx::query_as::<_, OrderRow>(&sql)
        .bind(establishment_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    {
        Ok(row) => row,
        Err(e) if is_missing_table(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    row.map(Order::try_from).transpose()
}

/// Page of matching orders, newest first, plus the unpaginated match count
pub async fn list(pool: &SqlitePool, filter: &OrderListFilter) -> RepoResult<(Vec<Order>, i64)> {
    let (where_clause, binds) = filter.where_clause();

    let sql =
        format!("{ORDER_SELECT} WHERE {where_clause} ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let mut query = sqlx::query_as::<_, OrderRow>(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }
    // LIMIT -1 means no limit in SQLite
    query = query
        .bind(filter.limit.unwrap_or(-1))
        .bind(filter.offset.unwrap_or(0));

    let rows = match query.fetch_all(pool).await {
        Ok(rows) => rows,
        Err(e) if is_missing_table(&e) => return Ok((Vec::new(), 0)),
        Err(e) => return Err(e.into()),
    };

    let count_sql = format!("SELECT COUNT(*) FROM orders WHERE {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query.fetch_one(pool).await?;

    let orders = rows
        .into_iter()
        .map(Order::try_from)
        .collect::<RepoResult<Vec<_>>>()?;
    Ok((orders, total))
}

/// Load a date range for aggregation, capped at `limit` documents
pub async fn find_in_range(
    pool: &SqlitePool,
    establishment_id: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE establishment_id = ? AND created_at >= ? AND created_at <= ? \
         ORDER BY created_at DESC LIMIT ?"
    );
    let rows = match sqlx::query_as::<_, OrderRow>(&sql)
        .bind(establishment_id)
        .bind(format_ts(start))
        .bind(format_ts(end))
        .bind(limit)
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows,
        Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    rows.into_iter().map(Order::try_from).collect()
}

/// Every order placed by a phone number, newest first
pub async fn find_by_customer_phone(
    pool: &SqlitePool,
    establishment_id: &str,
    phone: &str,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE establishment_id = ? AND customer_phone = ? \
         ORDER BY created_at DESC"
    );
    let rows = match sqlx::query_as::<_, OrderRow>(&sql)
        .bind(establishment_id)
        .bind(phone)
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows,
        Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    rows.into_iter().map(Order::try_from).collect()
}

/// Persist a status transition: status, appended history, and `updated_at`
pub async fn update_status(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    let history = serde_json::to_string(&order.status_history)
        .map_err(|e| RepoError::Database(format!("Failed to encode status history: {e}")))?;

    let result = sqlx::query(
        "UPDATE orders SET status = ?, status_history = ?, updated_at = ? \
         WHERE establishment_id = ? AND id = ?",
    )
    .bind(order.status.as_str())
    .bind(history)
    .bind(format_ts(&order.updated_at))
    .bind(&order.establishment_id)
    .bind(&order.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Order {} not found",
            order.id
        )));
    }
    Ok(())
}
