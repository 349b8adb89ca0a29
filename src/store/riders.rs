use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rider::{GeoPoint, Rider, RiderLocation};

#[derive(Default)]
pub struct RiderStore {
    riders: DashMap<Uuid, Rider>,
    usernames: DashMap<String, Uuid>,
    locations: DashMap<Uuid, RiderLocation>,
}

impl RiderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rider, claiming the username first so two concurrent
    /// registrations of the same name cannot both succeed.
    pub fn insert(&self, rider: Rider) -> Result<(), AppError> {
        match self.usernames.entry(rider.username.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "username {} is already taken",
                rider.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(rider.id);
                self.riders.insert(rider.id, rider);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Result<Rider, AppError> {
        self.riders
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))
    }

    pub fn find_by_username(&self, username: &str) -> Option<Rider> {
        let id = *self.usernames.get(username)?;
        self.riders.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    /// Overwrites the rider's single current position.
    pub fn upsert_location(&self, rider_id: Uuid, coords: GeoPoint) -> RiderLocation {
        let location = RiderLocation {
            rider_id,
            coords,
            updated_at: Utc::now(),
        };
        self.locations.insert(rider_id, location.clone());
        location
    }

    pub fn location(&self, rider_id: &Uuid) -> Option<RiderLocation> {
        self.locations.get(rider_id).map(|entry| entry.value().clone())
    }
}
