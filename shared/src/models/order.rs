//! Order model
//!
//! Wire shapes mirror the stored order documents one-to-one and round-trip
//! through serde without loss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    /// Wire/storage representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// Parse the wire representation; `None` for anything outside the lifecycle
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "PREPARING" => Some(OrderStatus::Preparing),
            "READY" => Some(OrderStatus::Ready),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELED" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, OrderStatus::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order fulfillment mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "delivery",
            DeliveryType::Pickup => "pickup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "delivery" => Some(DeliveryType::Delivery),
            "pickup" => Some(DeliveryType::Pickup),
            _ => None,
        }
    }
}

/// A selected option inside an additionals group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalOption {
    pub name: String,
    /// Price in currency unit
    pub price: f64,
}

/// Named group of selected options (e.g. "Extras", "Sauces")
///
/// The group cost is the sum of its selected option prices, applied once
/// per unit of the item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Additional {
    pub name: String,
    pub options: Vec<AdditionalOption>,
}

/// Order line item
///
/// `product_name` and `unit_price` are snapshots taken at order time and
/// stay valid even if the live product changes later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// Price in currency unit
    pub unit_price: f64,
    /// (unit price + additionals) × quantity
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub additionals: Vec<Additional>,
}

/// Append-only status history entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryItem {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human-facing order number
    pub number: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    pub establishment_id: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    /// Delivery fee in currency unit
    pub delivery_fee: f64,
    /// Sum of item totals
    pub subtotal: f64,
    /// Subtotal plus delivery fee
    pub total: f64,
    pub payment_method: String,
    /// Change due for cash payments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_history: Vec<StatusHistoryItem>,
}

/// Order creation request
///
/// Totals are never accepted from the caller; the pricing engine computes
/// them from the raw items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    pub establishment_id: String,
    pub items: Vec<OrderItemDraft>,
    pub delivery_type: DeliveryType,
    pub delivery_fee: f64,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Line item inside an [`OrderDraft`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDraft {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// Price in currency unit
    pub unit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub additionals: Vec<Additional>,
}

/// One page of an order listing, with the unpaginated match count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}
