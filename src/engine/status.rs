use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::refresh_bucket_gauge;
use crate::error::AppError;
use crate::models::order::{HistoryEntry, Order, OrderStatus};
use crate::state::AppState;

/// Who is moving the order along.
#[derive(Debug, Clone, Copy)]
enum Requester<'a> {
    Rider { id: Uuid, name: &'a str },
    Staff,
}

impl<'a> Requester<'a> {
    fn rider_name(self) -> Option<&'a str> {
        match self {
            Requester::Rider { name, .. } => Some(name),
            Requester::Staff => None,
        }
    }
}

/// Rider-initiated status change. Only the rider holding the assignment may
/// move the order; `rider_name` is recorded in the history entry.
pub fn apply_status_change(
    state: &AppState,
    order_id: Uuid,
    new_status: OrderStatus,
    rider_id: Uuid,
    rider_name: &str,
) -> Result<Order, AppError> {
    transition(
        state,
        order_id,
        new_status,
        Requester::Rider {
            id: rider_id,
            name: rider_name,
        },
    )
}

/// Warehouse-side status change (packing, dispatch, cancellation).
pub fn apply_staff_status_change(
    state: &AppState,
    order_id: Uuid,
    new_status: OrderStatus,
) -> Result<Order, AppError> {
    transition(state, order_id, new_status, Requester::Staff)
}

/// Permitted `(from, to)` pairs for the delivery lifecycle. Delivered and
/// Cancelled are terminal.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    matches!(
        (from, to),
        (Placed, Packed)
            | (Packed, Shipped)
            | (Packed, OutForDelivery)
            | (Shipped, OutForDelivery)
            | (OutForDelivery, Delivered)
            | (OutForDelivery, Packed)
            | (Placed | Packed | Shipped | OutForDelivery, Cancelled)
    )
}

fn transition(
    state: &AppState,
    order_id: Uuid,
    new_status: OrderStatus,
    requester: Requester<'_>,
) -> Result<Order, AppError> {
    let start = Instant::now();
    let result = state
        .orders
        .update(&order_id, |order| apply(order, new_status, requester, Utc::now()));
    state
        .metrics
        .observe_latency("status_change", start.elapsed().as_secs_f64());

    match &result {
        Ok(order) => {
            state
                .metrics
                .status_transitions_total
                .with_label_values(&[new_status.label()])
                .inc();
            refresh_bucket_gauge(state);
            info!(
                order_id = %order_id,
                status = %order.order_status,
                rider = requester.rider_name().unwrap_or("staff"),
                "order status updated"
            );
        }
        Err(err) => {
            state.metrics.record_rejection(err.reason());
            warn!(
                order_id = %order_id,
                status = %new_status,
                rider = requester.rider_name().unwrap_or("staff"),
                error = %err,
                "order status change rejected"
            );
        }
    }

    result
}

fn apply(
    order: &mut Order,
    new_status: OrderStatus,
    requester: Requester<'_>,
    now: DateTime<Utc>,
) -> Result<Order, AppError> {
    if let Requester::Rider { id, .. } = requester {
        if order.assignment.rider_id != Some(id) {
            return Err(AppError::Forbidden(
                "you are not assigned to this order".to_string(),
            ));
        }
    }

    if !is_valid_transition(order.order_status, new_status) {
        return Err(AppError::InvalidTransition {
            from: order.order_status.to_string(),
            to: new_status.to_string(),
        });
    }

    order.order_status = new_status;
    order.timestamps.stamp(new_status, now);

    match new_status {
        OrderStatus::Delivered => {
            if order.assignment.rider_id.is_some() {
                order.assignment.completed = true;
                order.assignment.delivered_at = Some(now);
            }
            order.in_bucket = false;
        }
        OrderStatus::Cancelled => order.release(),
        _ => {}
    }

    order.history.push(HistoryEntry {
        action: new_status,
        rider_name: requester.rider_name().map(str::to_string),
        timestamp: now,
    });

    Ok(order.clone())
}
