use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{
    Assignment, LineItem, Order, OrderStatus, PaymentMethod, ReturnStatus, ReturnTimeline,
    ShippingAddress, StatusTimestamps,
};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

pub fn place_order(state: &AppState, new_order: NewOrder) -> Result<Order, AppError> {
    if new_order.items.is_empty() {
        return Err(AppError::BadRequest("order must contain at least one item".to_string()));
    }

    if new_order.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::BadRequest("item quantity must be > 0".to_string()));
    }

    let pincode = new_order.shipping_address.pincode.trim().to_string();
    if pincode.is_empty() {
        return Err(AppError::BadRequest("pincode cannot be empty".to_string()));
    }

    if !state.is_serviceable(&pincode) {
        return Err(AppError::BadRequest(format!(
            "pincode {pincode} is not serviceable"
        )));
    }

    let total_amount = order_total(&new_order.items)?;
    let now = Utc::now();
    let mut shipping_address = new_order.shipping_address;
    shipping_address.pincode = pincode;

    let order = Order {
        id: Uuid::new_v4(),
        customer_id: new_order.customer_id,
        items: new_order.items,
        shipping_address,
        payment_method: new_order.payment_method,
        total_amount,
        order_status: OrderStatus::Placed,
        timestamps: StatusTimestamps::placed(now),
        in_bucket: false,
        assignment: Assignment::unassigned(),
        return_status: ReturnStatus::NotApplicable,
        return_timeline: ReturnTimeline::default(),
        history: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.orders.insert(order.clone());
    info!(
        order_id = %order.id,
        pincode = %order.shipping_address.pincode,
        total = order.total_amount,
        "order placed"
    );

    Ok(order)
}

fn order_total(items: &[LineItem]) -> Result<u64, AppError> {
    items.iter().try_fold(0u64, |total, item| {
        u64::from(item.quantity)
            .checked_mul(item.unit_price)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| AppError::BadRequest("order total overflows".to_string()))
    })
}
