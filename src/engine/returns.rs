use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, ReturnStatus};
use crate::state::AppState;

/// The return sub-lifecycle only moves one step forward at a time.
pub fn is_valid_return_transition(from: ReturnStatus, to: ReturnStatus) -> bool {
    use ReturnStatus::*;

    matches!(
        (from, to),
        (NotApplicable, Requested)
            | (Requested, Approved)
            | (Approved, PickedUp)
            | (PickedUp, InTransit)
            | (InTransit, Completed)
            | (Completed, RefundInitiated)
            | (RefundInitiated, RefundCompleted)
    )
}

/// Moves the order's return status. Delivery status is left untouched, but a
/// return can only be opened on a delivered order.
pub fn set_return_status(
    state: &AppState,
    order_id: Uuid,
    new_status: ReturnStatus,
) -> Result<Order, AppError> {
    let start = Instant::now();
    let result = state
        .orders
        .update(&order_id, |order| apply(order, new_status, Utc::now()));
    state
        .metrics
        .observe_latency("return_status", start.elapsed().as_secs_f64());

    match &result {
        Ok(_) => {
            state
                .metrics
                .return_transitions_total
                .with_label_values(&[new_status.label()])
                .inc();
            info!(order_id = %order_id, return_status = %new_status, "return status updated");
        }
        Err(err) => {
            state.metrics.record_rejection(err.reason());
            warn!(
                order_id = %order_id,
                return_status = %new_status,
                error = %err,
                "return status change rejected"
            );
        }
    }

    result
}

fn apply(order: &mut Order, new_status: ReturnStatus, now: DateTime<Utc>) -> Result<Order, AppError> {
    if new_status == ReturnStatus::Requested && order.order_status != OrderStatus::Delivered {
        return Err(AppError::Conflict(format!(
            "order {} is {}; only delivered orders can be returned",
            order.id, order.order_status
        )));
    }

    if !is_valid_return_transition(order.return_status, new_status) {
        return Err(AppError::InvalidTransition {
            from: order.return_status.to_string(),
            to: new_status.to_string(),
        });
    }

    order.return_status = new_status;
    order.return_timeline.stamp(new_status, now);
    Ok(order.clone())
}
