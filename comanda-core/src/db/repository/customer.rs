//! Customer repository

use super::{RepoError, RepoResult, format_ts, is_missing_table, parse_ts};
use shared::models::{Customer, CustomerUpdate};
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str = "SELECT id, name, email, phone, address, establishment_id, \
     created_at, updated_at FROM customers";

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    email: Option<String>,
    phone: String,
    address: Option<String>,
    establishment_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepoError;

    fn try_from(row: CustomerRow) -> RepoResult<Customer> {
        Ok(Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            establishment_id: row.establishment_id,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

pub async fn find_all(pool: &SqlitePool, establishment_id: &str) -> RepoResult<Vec<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE establishment_id = ? ORDER BY created_at DESC");
    let rows = match sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(establishment_id)
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows,
        Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    rows.into_iter().map(Customer::try_from).collect()
}

pub async fn search(
    pool: &SqlitePool,
    establishment_id: &str,
    query: &str,
) -> RepoResult<Vec<Customer>> {
    let pattern = format!("%{query}%");
    let sql = format!(
        "{CUSTOMER_SELECT} WHERE establishment_id = ?1 \
         AND (name LIKE ?2 OR phone LIKE ?2 OR email LIKE ?2) \
         ORDER BY created_at DESC"
    );
    let rows = match sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(establishment_id)
        .bind(&pattern)
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows,
        Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    rows.into_iter().map(Customer::try_from).collect()
}

pub async fn find_by_id(
    pool: &SqlitePool,
    establishment_id: &str,
    id: &str,
) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE establishment_id = ? AND id = ?");
    let row = match sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(establishment_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    {
        Ok(row) => row,
        Err(e) if is_missing_table(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    row.map(Customer::try_from).transpose()
}

/// Phone numbers identify customers within an establishment
pub async fn find_by_phone(
    pool: &SqlitePool,
    establishment_id: &str,
    phone: &str,
) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE establishment_id = ? AND phone = ? LIMIT 1");
    let row = match sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(establishment_id)
        .bind(phone)
        .fetch_optional(pool)
        .await
    {
        Ok(row) => row,
        Err(e) if is_missing_table(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    row.map(Customer::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, customer: &Customer) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO customers (id, name, email, phone, address, establishment_id, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(&customer.establishment_id)
    .bind(format_ts(&customer.created_at))
    .bind(format_ts(&customer.updated_at))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &SqlitePool,
    establishment_id: &str,
    id: &str,
    data: &CustomerUpdate,
) -> RepoResult<Customer> {
    let now = format_ts(&chrono::Utc::now());
    let result = sqlx::query(
        "UPDATE customers SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), \
         email = COALESCE(?3, email), address = COALESCE(?4, address), updated_at = ?5 \
         WHERE establishment_id = ?6 AND id = ?7",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(&now)
    .bind(establishment_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, establishment_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}
