pub mod get;
pub mod get_inventory;
pub mod list;
pub mod nearby;
pub mod summary;

pub use get::{GetHospitalError, GetHospitalQuery};
pub use get_inventory::{GetHospitalInventoryError, GetHospitalInventoryQuery};
pub use list::{ListHospitalsError, ListHospitalsQuery};
pub use nearby::{NearbyHospital, NearbyHospitalsError, NearbyHospitalsQuery};
pub use summary::{BloodSummaryError, BloodSummaryQuery, BloodSummaryRecord};
