use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::{ApiJson, ApiPath};
use crate::engine::queries;
use crate::engine::status::apply_status_change;
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::rider::RiderSession;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/delivery/bucket/:rider_name", get(rider_bucket))
        .route("/delivery/completed/:rider_name", get(rider_completed))
        .route("/delivery/orders/:id/status", post(update_status))
}

#[derive(Deserialize)]
pub struct RiderStatusRequest {
    pub status: OrderStatus,
}

async fn rider_bucket(
    State(state): State<Arc<AppState>>,
    ApiPath(rider_name): ApiPath<String>,
) -> Json<Vec<Order>> {
    Json(queries::bucket(&state, &rider_name))
}

async fn rider_completed(
    State(state): State<Arc<AppState>>,
    ApiPath(rider_name): ApiPath<String>,
) -> Json<Vec<Order>> {
    Json(queries::completed(&state, &rider_name))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    session: RiderSession,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RiderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(apply_status_change(
        &state,
        id,
        payload.status,
        session.rider_id,
        &session.rider_name,
    )?))
}
