pub mod orders;
pub mod riders;
