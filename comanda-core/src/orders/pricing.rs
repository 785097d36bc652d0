//! Pricing engine
//!
//! All arithmetic runs on `Decimal`; amounts convert back to `f64` with
//! 2-decimal half-up rounding only at the model boundary. Caller-supplied
//! totals are never trusted.

use rust_decimal::prelude::*;
use shared::error::{AppResult, ErrorCode};
use shared::models::{OrderDraft, OrderItem, OrderItemDraft};
use shared::AppError;
use uuid::Uuid;

const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit/option price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i64 = 9999;

pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn require_finite(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(
            AppError::validation(format!("{field} must be a finite number, got {value}"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::required_field(field));
    }
    Ok(())
}

fn require_price(value: f64, field: &str) -> AppResult<()> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(
            AppError::validation(format!("{field} must be non-negative, got {value}"))
                .with_detail("field", field),
        );
    }
    if value > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

fn validate_item(item: &OrderItemDraft) -> AppResult<()> {
    require_text(&item.product_id, "productId")?;
    require_text(&item.product_name, "productName")?;

    if item.quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        ))
        .with_detail("field", "quantity"));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!(
                "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
                item.quantity
            ),
        )
        .with_detail("field", "quantity"));
    }

    require_price(item.unit_price, "unitPrice")?;
    for group in &item.additionals {
        for option in &group.options {
            require_price(option.price, "additionals option price")?;
        }
    }
    Ok(())
}

/// Validate an order draft before pricing it
pub fn validate_draft(draft: &OrderDraft) -> AppResult<()> {
    require_text(&draft.establishment_id, "establishmentId")?;
    require_text(&draft.customer_name, "customerName")?;
    require_text(&draft.customer_phone, "customerPhone")?;
    require_text(&draft.payment_method, "paymentMethod")?;

    if draft.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for item in &draft.items {
        validate_item(item)?;
    }

    require_price(draft.delivery_fee, "deliveryFee")?;
    if let Some(change) = draft.change {
        require_price(change, "change")?;
    }
    Ok(())
}

/// Per-unit cost of every selected option across all additionals groups
pub fn additionals_price(item: &OrderItemDraft) -> Decimal {
    item.additionals
        .iter()
        .flat_map(|group| &group.options)
        .map(|option| to_decimal(option.price))
        .sum()
}

/// Price the draft: line totals, subtotal, and grand total
///
/// `total_price = (unit_price + additionals) × quantity` per item;
/// `subtotal = Σ total_price`; `total = subtotal + delivery_fee`.
pub fn price_order(draft: &OrderDraft) -> AppResult<(Vec<OrderItem>, f64, f64)> {
    let mut subtotal = Decimal::ZERO;
    let mut items = Vec::with_capacity(draft.items.len());

    for item in &draft.items {
        let unit = to_decimal(item.unit_price) + additionals_price(item);
        let line = unit * Decimal::from(item.quantity);
        subtotal += line;

        items.push(OrderItem {
            id: Uuid::new_v4().to_string(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: to_f64(line),
            notes: item.notes.clone(),
            additionals: item.additionals.clone(),
        });
    }

    let total = subtotal + to_decimal(draft.delivery_fee);
    Ok((items, to_f64(subtotal), to_f64(total)))
}
