pub mod order;
pub mod pincode;
pub mod rider;
