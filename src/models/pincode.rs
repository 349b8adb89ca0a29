use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pincode {
    pub code: String,
    pub delivery_available: bool,
}
