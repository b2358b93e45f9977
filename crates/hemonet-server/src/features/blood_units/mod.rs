pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::blood_units_routes;
pub use types::BloodUnitView;
