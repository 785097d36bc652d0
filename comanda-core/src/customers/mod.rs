//! Customer enrichment service
//!
//! Listings join each customer with their order history (by phone within
//! the establishment) to derive lifetime spend, order count, and activity.
//! Sorting, status filtering, and pagination run after enrichment because
//! they depend on the derived fields.

use crate::config::CoreConfig;
use crate::db::DbService;
use crate::db::repository::{customer as customer_repo, order as order_repo};
use crate::orders::pricing::{to_decimal, to_f64};
use chrono::{DateTime, Duration, Utc};
use shared::error::AppResult;
use shared::models::{
    ActivityStatus, Customer, CustomerCreate, CustomerPage, CustomerSortField, CustomerUpdate,
    CustomerWithStats, Order, SortDirection,
};
use shared::AppError;
use sqlx::SqlitePool;
use std::cmp::Ordering;
use uuid::Uuid;

/// Query for customer listings
#[derive(Debug, Clone, Default)]
pub struct CustomerListQuery {
    /// Substring match over name, phone, and email
    pub search: Option<String>,
    pub status: Option<ActivityStatus>,
    pub sort_by: Option<CustomerSortField>,
    pub sort_direction: Option<SortDirection>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    pool: SqlitePool,
    active_window_days: i64,
}

impl CustomerService {
    pub fn new(db: &DbService, config: &CoreConfig) -> Self {
        Self {
            pool: db.pool.clone(),
            active_window_days: config.customer_active_window_days,
        }
    }

    /// Enriched customer listing; `total` counts the filtered set before
    /// pagination
    pub async fn list(
        &self,
        establishment_id: &str,
        query: CustomerListQuery,
    ) -> AppResult<CustomerPage> {
        if establishment_id.trim().is_empty() {
            return Err(AppError::required_field("establishmentId"));
        }

        let customers = match &query.search {
            Some(term) => customer_repo::search(&self.pool, establishment_id, term).await?,
            None => customer_repo::find_all(&self.pool, establishment_id).await?,
        };

        let now = Utc::now();
        let mut enriched = Vec::with_capacity(customers.len());
        for customer in customers {
            let orders =
                order_repo::find_by_customer_phone(&self.pool, establishment_id, &customer.phone)
                    .await?;
            enriched.push(enrich(customer, &orders, now, self.active_window_days));
        }

        if let Some(status) = query.status {
            enriched.retain(|c| c.status == status);
        }
        sort_customers(
            &mut enriched,
            query.sort_by.unwrap_or(CustomerSortField::Name),
            query.sort_direction.unwrap_or(SortDirection::Asc),
        );

        let total = enriched.len() as i64;
        let offset = query.offset.unwrap_or(0);
        let customers: Vec<_> = enriched
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(CustomerPage { customers, total })
    }

    pub async fn get(&self, establishment_id: &str, id: &str) -> AppResult<Customer> {
        customer_repo::find_by_id(&self.pool, establishment_id, id)
            .await?
            .ok_or_else(|| AppError::customer_not_found(id))
    }

    pub async fn create(&self, data: CustomerCreate) -> AppResult<Customer> {
        if data.establishment_id.trim().is_empty() {
            return Err(AppError::required_field("establishmentId"));
        }
        if data.name.trim().is_empty() {
            return Err(AppError::required_field("name"));
        }
        if data.phone.trim().is_empty() {
            return Err(AppError::required_field("phone"));
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            address: data.address,
            establishment_id: data.establishment_id,
            created_at: now,
            updated_at: now,
        };
        customer_repo::create(&self.pool, &customer).await?;
        tracing::debug!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    /// Apply contact-detail changes; `None` fields stay untouched
    pub async fn update(
        &self,
        establishment_id: &str,
        id: &str,
        data: CustomerUpdate,
    ) -> AppResult<Customer> {
        customer_repo::update(&self.pool, establishment_id, id, &data)
            .await
            .map_err(|err| match err {
                crate::db::repository::RepoError::NotFound(_) => AppError::customer_not_found(id),
                other => other.into(),
            })
    }
}

/// Derive the order statistics for one customer
///
/// Lifetime figures include canceled orders: the report side excludes them,
/// but customer spend intentionally keeps the full history.
pub(crate) fn enrich(
    customer: Customer,
    orders: &[Order],
    now: DateTime<Utc>,
    active_window_days: i64,
) -> CustomerWithStats {
    let total_orders = orders.len() as i64;
    let total_spent = to_f64(orders.iter().map(|o| to_decimal(o.total)).sum());
    let last_order_date = orders.iter().map(|o| o.created_at).max();

    let status = match last_order_date {
        Some(last) if now - last <= Duration::days(active_window_days) => ActivityStatus::Ativo,
        _ => ActivityStatus::Inativo,
    };

    CustomerWithStats {
        customer,
        total_orders,
        total_spent,
        last_order_date,
        status,
    }
}

fn sort_customers(
    customers: &mut [CustomerWithStats],
    field: CustomerSortField,
    direction: SortDirection,
) {
    customers.sort_by(|a, b| {
        let ordering = match field {
            CustomerSortField::Name => a.customer.name.cmp(&b.customer.name),
            CustomerSortField::TotalOrders => a.total_orders.cmp(&b.total_orders),
            CustomerSortField::TotalSpent => a
                .total_spent
                .partial_cmp(&b.total_spent)
                .unwrap_or(Ordering::Equal),
            CustomerSortField::LastOrderDate => a.last_order_date.cmp(&b.last_order_date),
            CustomerSortField::CreatedAt => a.customer.created_at.cmp(&b.customer.created_at),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
