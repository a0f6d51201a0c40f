pub mod booking;
pub mod branch;
pub mod package;
pub mod party;
pub mod pickup;
pub mod shipment;
