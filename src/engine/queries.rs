use serde::Deserialize;

use crate::models::order::{Order, OrderStatus, ReturnStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReturnsFilter {
    #[default]
    All,
    Active,
    Completed,
}

pub fn all(state: &AppState) -> Vec<Order> {
    state.orders.filter(|_| true)
}

/// Packed orders in `pincode` that no rider holds yet.
pub fn available(state: &AppState, pincode: &str) -> Vec<Order> {
    state.orders.filter(|order| {
        order.order_status == OrderStatus::Packed
            && !order.in_bucket
            && order.shipping_address.pincode == pincode
    })
}

pub fn bucket(state: &AppState, rider_name: &str) -> Vec<Order> {
    state.orders.filter(|order| {
        order.in_bucket && order.assignment.rider_name.as_deref() == Some(rider_name)
    })
}

pub fn completed(state: &AppState, rider_name: &str) -> Vec<Order> {
    state.orders.filter(|order| {
        order.assignment.completed && order.assignment.rider_name.as_deref() == Some(rider_name)
    })
}

pub fn returns(state: &AppState, filter: ReturnsFilter) -> Vec<Order> {
    state.orders.filter(|order| {
        let status = order.return_status;
        status != ReturnStatus::NotApplicable
            && match filter {
                ReturnsFilter::All => true,
                ReturnsFilter::Active => !status.is_return_finished(),
                ReturnsFilter::Completed => status.is_return_finished(),
            }
    })
}
