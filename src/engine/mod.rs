pub mod bucket;
pub mod placement;
pub mod queries;
pub mod returns;
pub mod status;

use crate::state::AppState;

fn refresh_bucket_gauge(state: &AppState) {
    let held = state.orders.count(|order| order.in_bucket);
    state.metrics.orders_in_bucket.set(held as i64);
}
