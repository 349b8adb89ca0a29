use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{ApiJson, ApiPath};
use crate::engine::bucket::{toggle_claim, ClaimOutcome};
use crate::engine::placement::{place_order, NewOrder};
use crate::engine::queries::{self, ReturnsFilter};
use crate::engine::returns::set_return_status;
use crate::engine::status::apply_staff_status_change;
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, ReturnStatus};
use crate::models::rider::RiderSession;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/returns", get(list_returns))
        .route("/orders/available/:pincode", get(list_available))
        .route("/orders/bucket/:id/toggle", post(toggle_bucket))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", post(update_status))
        .route("/orders/:id/return-status", post(update_return_status))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct UpdateReturnStatusRequest {
    pub return_status: ReturnStatus,
}

#[derive(Deserialize)]
pub struct ReturnsQuery {
    #[serde(default)]
    pub state: ReturnsFilter,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub outcome: &'static str,
    pub message: &'static str,
    pub order: Order,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewOrder>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(place_order(&state, payload)?))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(queries::all(&state))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get(&id)?))
}

async fn list_available(
    State(state): State<Arc<AppState>>,
    ApiPath(pincode): ApiPath<String>,
) -> Json<Vec<Order>> {
    Json(queries::available(&state, pincode.trim()))
}

async fn list_returns(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReturnsQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Query(query) = query?;
    Ok(Json(queries::returns(&state, query.state)))
}

async fn toggle_bucket(
    State(state): State<Arc<AppState>>,
    session: RiderSession,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    match toggle_claim(&state, id, session.rider_id, &session.rider_name)? {
        ClaimOutcome::Added(order) => Ok(Json(ToggleResponse {
            outcome: "added",
            message: "Order added",
            order,
        })),
        ClaimOutcome::Removed(order) => Ok(Json(ToggleResponse {
            outcome: "removed",
            message: "Order removed",
            order,
        })),
        ClaimOutcome::RejectedOtherRider { holder_name } => Err(AppError::Conflict(format!(
            "Order already in bucketlist of rider {holder_name}"
        ))),
    }
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(apply_staff_status_change(&state, id, payload.status)?))
}

async fn update_return_status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateReturnStatusRequest>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(set_return_status(&state, id, payload.return_status)?))
}
