pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::hospitals_routes;
pub use types::{InventoryItemError, InventoryItemInput};
