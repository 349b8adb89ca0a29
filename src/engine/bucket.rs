use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::refresh_bucket_gauge;
use crate::error::AppError;
use crate::models::order::{Assignment, Order};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Added(Order),
    Removed(Order),
    RejectedOtherRider { holder_name: String },
}

impl ClaimOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ClaimOutcome::Added(_) => "added",
            ClaimOutcome::Removed(_) => "removed",
            ClaimOutcome::RejectedOtherRider { .. } => "rejected_other_rider",
        }
    }
}

/// Adds the order to the rider's bucket, or releases it when the same rider
/// already holds it. The check and the write happen under the order's lock,
/// so two riders racing for one order never both get `Added`.
pub fn toggle_claim(
    state: &AppState,
    order_id: Uuid,
    rider_id: Uuid,
    rider_name: &str,
) -> Result<ClaimOutcome, AppError> {
    let start = Instant::now();
    let result = state
        .orders
        .update(&order_id, |order| apply_toggle(order, rider_id, rider_name, Utc::now()));
    state
        .metrics
        .observe_latency("toggle_claim", start.elapsed().as_secs_f64());

    match &result {
        Ok(outcome) => {
            state
                .metrics
                .bucket_claims_total
                .with_label_values(&[outcome.label()])
                .inc();

            match outcome {
                ClaimOutcome::RejectedOtherRider { holder_name } => {
                    warn!(
                        order_id = %order_id,
                        rider_id = %rider_id,
                        holder = %holder_name,
                        "claim rejected: order held by another rider"
                    );
                }
                _ => {
                    refresh_bucket_gauge(state);
                    info!(
                        order_id = %order_id,
                        rider_id = %rider_id,
                        outcome = outcome.label(),
                        "bucket toggled"
                    );
                }
            }
        }
        Err(err) => {
            state.metrics.record_rejection(err.reason());
            warn!(order_id = %order_id, rider_id = %rider_id, error = %err, "bucket toggle failed");
        }
    }

    result
}

fn apply_toggle(
    order: &mut Order,
    rider_id: Uuid,
    rider_name: &str,
    now: DateTime<Utc>,
) -> Result<ClaimOutcome, AppError> {
    if order.assignment.is_active() {
        if order.assignment.rider_id == Some(rider_id) {
            order.release();
            return Ok(ClaimOutcome::Removed(order.clone()));
        }

        let holder_name = order
            .assignment
            .rider_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        return Ok(ClaimOutcome::RejectedOtherRider { holder_name });
    }

    if order.assignment.completed {
        return Err(AppError::Conflict(format!(
            "order {} was already delivered",
            order.id
        )));
    }

    if !order.order_status.is_claimable() {
        return Err(AppError::Conflict(format!(
            "order {} is {} and cannot be claimed",
            order.id, order.order_status
        )));
    }

    order.in_bucket = true;
    order.assignment = Assignment::claimed_by(rider_id, rider_name, now);
    Ok(ClaimOutcome::Added(order.clone()))
}
