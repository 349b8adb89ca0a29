use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::Order;

/// Order collection. Each mutation runs under the entry's write lock against
/// a private copy, so a check-and-set either commits whole or not at all.
#[derive(Default)]
pub struct OrderStore {
    orders: DashMap<Uuid, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: &Uuid) -> Result<Order, AppError> {
        self.orders
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(id))
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Applies `update` atomically. If it returns an error the stored order
    /// is left untouched. The draft already carries the new `updated_at`
    /// while `update` runs, so copies taken inside it match what gets
    /// committed. A draft with no other change is not written.
    pub fn update<T, F>(&self, id: &Uuid, update: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Order) -> Result<T, AppError>,
    {
        let mut entry = self.orders.get_mut(id).ok_or_else(|| not_found(id))?;

        let stamped_at = Utc::now();
        let mut draft = entry.value().clone();
        draft.updated_at = stamped_at;
        let outcome = update(&mut draft)?;

        draft.updated_at = entry.value().updated_at;
        if draft != *entry.value() {
            draft.updated_at = stamped_at;
            *entry = draft;
        }

        Ok(outcome)
    }

    /// Orders matching `predicate`, newest first.
    pub fn filter<P>(&self, predicate: P) -> Vec<Order>
    where
        P: Fn(&Order) -> bool,
    {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    pub fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Order) -> bool,
    {
        self.orders
            .iter()
            .filter(|entry| predicate(entry.value()))
            .count()
    }
}

fn not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("order {} not found", id))
}
