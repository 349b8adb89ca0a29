use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::{ApiJson, ApiPath};
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::rider::{GeoPoint, Rider, RiderLocation, RiderSession};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(register_rider))
        .route("/riders/login", post(login))
        .route("/riders/logout", post(logout))
        .route(
            "/riders/:id/location",
            post(report_location).get(get_location),
        )
}

#[derive(Deserialize)]
pub struct RegisterRiderRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

#[derive(Serialize)]
pub struct LocationResponse {
    pub location: Option<RiderLocation>,
}

async fn register_rider(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRiderRequest>,
) -> Result<Json<Rider>, AppError> {
    let username = payload.username.trim().to_string();
    let name = payload.name.trim().to_string();

    if username.is_empty() {
        return Err(AppError::BadRequest("username cannot be empty".to_string()));
    }

    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let password_hash = blocking(move || hash_password(&payload.password)).await?;

    let rider = Rider {
        id: Uuid::new_v4(),
        username,
        password_hash,
        name,
        created_at: Utc::now(),
    };

    state.riders.insert(rider.clone())?;
    info!(rider_id = %rider.id, username = %rider.username, "rider registered");

    Ok(Json(rider))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<RiderSession>, AppError> {
    let invalid = || AppError::Unauthorized("invalid credentials".to_string());

    let rider = state
        .riders
        .find_by_username(payload.username.trim())
        .ok_or_else(invalid)?;

    let stored_hash = rider.password_hash.clone();
    let matches = blocking(move || verify_password(&stored_hash, &payload.password)).await?;
    if !matches {
        warn!(rider_id = %rider.id, "rider login failed");
        return Err(invalid());
    }

    let session = state.sessions.issue(&rider, Utc::now());
    info!(rider_id = %rider.id, "rider logged in");

    Ok(Json(session))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    session: RiderSession,
) -> Json<LogoutResponse> {
    let revoked = state.sessions.revoke(&session.token);
    info!(rider_id = %session.rider_id, "rider logged out");
    Json(LogoutResponse { revoked })
}

async fn report_location(
    State(state): State<Arc<AppState>>,
    session: RiderSession,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(coords): ApiJson<GeoPoint>,
) -> Result<Json<RiderLocation>, AppError> {
    if session.rider_id != id {
        return Err(AppError::Forbidden(
            "riders can only report their own location".to_string(),
        ));
    }

    if !coords.is_valid() {
        return Err(AppError::BadRequest(
            "lat must be within [-90, 90] and lng within [-180, 180]".to_string(),
        ));
    }

    Ok(Json(state.riders.upsert_location(id, coords)))
}

async fn get_location(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LocationResponse>, AppError> {
    state.riders.get(&id)?;

    Ok(Json(LocationResponse {
        location: state.riders.location(&id),
    }))
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AppError::Internal(format!("password task failed: {err}")))?
}
