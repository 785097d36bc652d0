//! Order status state machine
//!
//! The lifecycle runs PENDING → CONFIRMED → PREPARING → READY → DELIVERED.
//! CANCELED is reachable from every other status, including DELIVERED, and
//! accepts no outgoing transitions.

use chrono::{DateTime, Utc};
use shared::error::AppResult;
use shared::models::{Order, OrderStatus, StatusHistoryItem};
use shared::AppError;

/// Statuses an order may move to from `status`
pub fn allowed_transitions(status: OrderStatus) -> &'static [OrderStatus] {
    match status {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Canceled],
        OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Canceled],
        OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Canceled],
        OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Canceled],
        OrderStatus::Delivered => &[OrderStatus::Canceled],
        OrderStatus::Canceled => &[],
    }
}

/// Reject anything outside the transition table, including no-op moves to
/// the current status
pub fn validate_transition(current: OrderStatus, next: OrderStatus) -> AppResult<()> {
    if !allowed_transitions(current).contains(&next) {
        return Err(AppError::illegal_transition(current.as_str(), next.as_str()));
    }
    Ok(())
}

/// Move the order to `next`, appending exactly one history entry
///
/// The caller validates the transition first; this only mutates the
/// in-memory document.
pub fn apply_transition(
    order: &mut Order,
    next: OrderStatus,
    note: Option<String>,
    now: DateTime<Utc>,
) {
    order.status = next;
    order.updated_at = now;
    order.status_history.push(StatusHistoryItem {
        status: next,
        timestamp: now,
        note,
    });
}
