//! Order services
//!
//! Creation, lifecycle transitions, and listing. The service wires
//! validation, pricing, persistence, and event publication together;
//! the pure pieces live in the submodules.

pub mod number;
pub mod pricing;
pub mod status;

use crate::db::DbService;
use crate::db::repository::order::{self as order_repo, OrderListFilter};
use crate::db::repository::customer as customer_repo;
use crate::events::{OrderEvent, OrderEvents};
use chrono::{DateTime, Utc};
use number::{OrderNumberSource, TimestampNumberSource};
use shared::error::AppResult;
use shared::models::{Customer, Order, OrderDraft, OrderPage, OrderStatus, StatusHistoryItem};
use shared::AppError;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    numbers: Arc<dyn OrderNumberSource>,
    events: OrderEvents,
}

impl OrderService {
    pub fn new(db: &DbService, events: OrderEvents) -> Self {
        Self::with_number_source(db, events, Arc::new(TimestampNumberSource))
    }

    /// Construct with a custom order number allocator
    pub fn with_number_source(
        db: &DbService,
        events: OrderEvents,
        numbers: Arc<dyn OrderNumberSource>,
    ) -> Self {
        Self {
            pool: db.pool.clone(),
            numbers,
            events,
        }
    }

    /// Validate, price, and persist a new order
    ///
    /// The order starts as PENDING with a single-entry history. First-time
    /// customers get a customer record created from the order contact data.
    pub async fn create_order(&self, draft: OrderDraft) -> AppResult<Order> {
        pricing::validate_draft(&draft)?;
        let (items, subtotal, total) = pricing::price_order(&draft)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            number: self.numbers.next(now),
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            customer_address: draft.customer_address,
            establishment_id: draft.establishment_id,
            items,
            status: OrderStatus::Pending,
            delivery_type: draft.delivery_type,
            delivery_fee: draft.delivery_fee,
            subtotal,
            total,
            payment_method: draft.payment_method,
            change: draft.change,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
            status_history: vec![StatusHistoryItem {
                status: OrderStatus::Pending,
                timestamp: now,
                note: None,
            }],
        };

        order_repo::create(&self.pool, &order).await?;
        self.ensure_customer(&order, now).await?;

        tracing::debug!(order_id = %order.id, number = %order.number, total = order.total, "order created");
        self.events.publish(&OrderEvent::Created(order.clone()));
        Ok(order)
    }

    /// First order from a phone number creates the customer record
    async fn ensure_customer(&self, order: &Order, now: DateTime<Utc>) -> AppResult<()> {
        let existing =
            customer_repo::find_by_phone(&self.pool, &order.establishment_id, &order.customer_phone)
                .await?;
        if existing.is_some() {
            return Ok(());
        }

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: order.customer_name.clone(),
            email: None,
            phone: order.customer_phone.clone(),
            address: order.customer_address.clone(),
            establishment_id: order.establishment_id.clone(),
            created_at: now,
            updated_at: now,
        };
        customer_repo::create(&self.pool, &customer).await?;
        tracing::debug!(customer_id = %customer.id, "customer created from first order");
        Ok(())
    }

    pub async fn get_order(&self, establishment_id: &str, id: &str) -> AppResult<Order> {
        order_repo::find_by_id(&self.pool, establishment_id, id)
            .await?
            .ok_or_else(|| AppError::order_not_found(id))
    }

    /// Filtered page of orders, newest first; `total` ignores pagination
    pub async fn list_orders(&self, filter: OrderListFilter) -> AppResult<OrderPage> {
        if filter.establishment_id.trim().is_empty() {
            return Err(AppError::required_field("establishmentId"));
        }
        let (orders, total) = order_repo::list(&self.pool, &filter).await?;
        Ok(OrderPage { orders, total })
    }

    /// Validate and persist a status transition, appending one history entry
    ///
    /// `new_status` arrives as the raw request value; anything outside the
    /// lifecycle is rejected before the order is even loaded. Writes are
    /// last-write-wins: there is no optimistic locking on the status column.
    pub async fn update_status(
        &self,
        establishment_id: &str,
        id: &str,
        new_status: &str,
        note: Option<String>,
    ) -> AppResult<Order> {
        let next =
            OrderStatus::parse(new_status).ok_or_else(|| AppError::invalid_status(new_status))?;

        let mut order = self.get_order(establishment_id, id).await?;
        let previous = order.status;
        status::validate_transition(previous, next)?;
        status::apply_transition(&mut order, next, note, Utc::now());

        order_repo::update_status(&self.pool, &order).await?;

        tracing::debug!(order_id = %order.id, from = %previous, to = %next, "order status updated");
        self.events.publish(&OrderEvent::StatusUpdated {
            order: order.clone(),
            previous,
        });
        Ok(order)
    }
}
