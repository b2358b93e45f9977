//! Data access layer
//!
//! - **hospitals**: hospital row CRUD, existence checks, soft delete
//! - **blood_units**: the authoritative blood unit store
//! - **snapshots**: propagation of store writes into the per-hospital
//!   `blood_inventory` JSONB array

pub mod blood_units;
pub mod hospitals;
pub mod snapshots;
