use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rider::{Rider, RiderSession};
use crate::state::AppState;

pub struct SessionStore {
    sessions: DashMap<Uuid, RiderSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issues a fresh token and drops every session that has expired by
    /// `issued_at`, so abandoned tokens do not pile up.
    pub fn issue(&self, rider: &Rider, issued_at: DateTime<Utc>) -> RiderSession {
        self.sessions.retain(|_, session| !session.is_expired(issued_at));

        let session = RiderSession {
            token: Uuid::new_v4(),
            rider_id: rider.id,
            rider_name: rider.name.clone(),
            issued_at,
            expires_at: issued_at + self.ttl,
        };
        self.sessions.insert(session.token, session.clone());
        session
    }

    /// Looks up a live session. Expired sessions are dropped on sight.
    pub fn resolve(&self, token: &Uuid, now: DateTime<Utc>) -> Result<RiderSession, AppError> {
        let session = self
            .sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Unauthorized("unknown session".to_string()))?;

        if session.is_expired(now) {
            self.sessions.remove(token);
            return Err(AppError::Unauthorized("session expired".to_string()));
        }

        Ok(session)
    }

    pub fn revoke(&self, token: &Uuid) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn bearer_token(parts: &Parts) -> Result<Uuid, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

    Uuid::parse_str(token.trim())
        .map_err(|_| AppError::Unauthorized("malformed bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RiderSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.sessions.resolve(&token, Utc::now())
    }
}
