use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    #[serde(rename = "Order Placed")]
    Placed,
    #[serde(rename = "Packed / Processing")]
    Packed,
    #[serde(rename = "Shipped / Dispatched")]
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Order Placed",
            OrderStatus::Packed => "Packed / Processing",
            OrderStatus::Shipped => "Shipped / Dispatched",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses in which a rider may take the order into their bucket.
    pub fn is_claimable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Packed | OrderStatus::Shipped | OrderStatus::OutForDelivery
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ReturnStatus {
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
    #[serde(rename = "Return Requested")]
    Requested,
    #[serde(rename = "Return Approved / Pickup Scheduled")]
    Approved,
    #[serde(rename = "Return Picked Up")]
    PickedUp,
    #[serde(rename = "Return in Transit")]
    InTransit,
    #[serde(rename = "Return Completed")]
    Completed,
    #[serde(rename = "Refund Initiated")]
    RefundInitiated,
    #[serde(rename = "Refund Completed")]
    RefundCompleted,
}

impl ReturnStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReturnStatus::NotApplicable => "N/A",
            ReturnStatus::Requested => "Return Requested",
            ReturnStatus::Approved => "Return Approved / Pickup Scheduled",
            ReturnStatus::PickedUp => "Return Picked Up",
            ReturnStatus::InTransit => "Return in Transit",
            ReturnStatus::Completed => "Return Completed",
            ReturnStatus::RefundInitiated => "Refund Initiated",
            ReturnStatus::RefundCompleted => "Refund Completed",
        }
    }

    /// True once the returned goods are back, including the refund steps.
    pub fn is_return_finished(&self) -> bool {
        matches!(
            self,
            ReturnStatus::Completed | ReturnStatus::RefundInitiated | ReturnStatus::RefundCompleted
        )
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "UPI")]
    Upi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Rider binding for an order. All fields are empty while unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Assignment {
    pub rider_id: Option<Uuid>,
    pub rider_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

impl Assignment {
    pub fn unassigned() -> Self {
        Self::default()
    }

    pub fn claimed_by(rider_id: Uuid, rider_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            rider_id: Some(rider_id),
            rider_name: Some(rider_name.to_string()),
            assigned_at: Some(now),
            delivered_at: None,
            completed: false,
        }
    }

    /// Held by a rider and not yet delivered.
    pub fn is_active(&self) -> bool {
        self.rider_id.is_some() && !self.completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusTimestamps {
    pub placed_at: DateTime<Utc>,
    pub packed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl StatusTimestamps {
    pub fn placed(now: DateTime<Utc>) -> Self {
        Self {
            placed_at: now,
            packed_at: None,
            shipped_at: None,
            out_for_delivery_at: None,
            delivered_at: None,
        }
    }

    /// Records the first time `status` is reached. Later visits keep the
    /// original instant.
    pub fn stamp(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        let slot = match status {
            OrderStatus::Packed => &mut self.packed_at,
            OrderStatus::Shipped => &mut self.shipped_at,
            OrderStatus::OutForDelivery => &mut self.out_for_delivery_at,
            OrderStatus::Delivered => &mut self.delivered_at,
            OrderStatus::Placed | OrderStatus::Cancelled => return,
        };
        slot.get_or_insert(now);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReturnTimeline {
    pub requested_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub in_transit_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refund_initiated_at: Option<DateTime<Utc>>,
    pub refund_completed_at: Option<DateTime<Utc>>,
}

impl ReturnTimeline {
    pub fn stamp(&mut self, status: ReturnStatus, now: DateTime<Utc>) {
        let slot = match status {
            ReturnStatus::Requested => &mut self.requested_at,
            ReturnStatus::Approved => &mut self.approved_at,
            ReturnStatus::PickedUp => &mut self.picked_up_at,
            ReturnStatus::InTransit => &mut self.in_transit_at,
            ReturnStatus::Completed => &mut self.completed_at,
            ReturnStatus::RefundInitiated => &mut self.refund_initiated_at,
            ReturnStatus::RefundCompleted => &mut self.refund_completed_at,
            ReturnStatus::NotApplicable => return,
        };
        slot.get_or_insert(now);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub action: OrderStatus,
    pub rider_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: u64,
    pub order_status: OrderStatus,
    pub timestamps: StatusTimestamps,
    pub in_bucket: bool,
    #[serde(default)]
    pub assignment: Assignment,
    #[serde(default)]
    pub return_status: ReturnStatus,
    #[serde(default)]
    pub return_timeline: ReturnTimeline,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// `in_bucket` mirrors an active (held, undelivered) assignment.
    pub fn bucket_invariant_holds(&self) -> bool {
        self.in_bucket == self.assignment.is_active()
    }

    pub fn release(&mut self) {
        self.in_bucket = false;
        self.assignment = Assignment::unassigned();
    }
}
