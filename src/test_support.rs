use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::order::{
    Assignment, LineItem, Order, OrderStatus, PaymentMethod, ReturnStatus, ReturnTimeline,
    ShippingAddress, StatusTimestamps,
};
use crate::state::AppState;

pub fn test_state() -> AppState {
    AppState::new(&Config::default())
}

pub fn order_with_status(pincode: &str, status: OrderStatus) -> Order {
    let now = Utc::now();
    let mut timestamps = StatusTimestamps::placed(now);
    timestamps.stamp(status, now);

    Order {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        items: vec![LineItem {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: 14_900,
        }],
        shipping_address: ShippingAddress {
            line1: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: pincode.to_string(),
        },
        payment_method: PaymentMethod::Cod,
        total_amount: 29_800,
        order_status: status,
        timestamps,
        in_bucket: false,
        assignment: Assignment::unassigned(),
        return_status: ReturnStatus::NotApplicable,
        return_timeline: ReturnTimeline::default(),
        history: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn packed_order(pincode: &str) -> Order {
    order_with_status(pincode, OrderStatus::Packed)
}

/// Inserts a packed order into `state` and returns its id.
pub fn seed_packed(state: &AppState, pincode: &str) -> Uuid {
    let order = packed_order(pincode);
    let id = order.id;
    state.orders.insert(order);
    id
}
