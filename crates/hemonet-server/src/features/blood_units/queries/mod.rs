pub mod get;
pub mod list;
pub mod list_by_hospital;

pub use get::{GetBloodUnitError, GetBloodUnitQuery};
pub use list::{ListBloodUnitsError, ListBloodUnitsQuery};
pub use list_by_hospital::{ListByHospitalError, ListByHospitalQuery};
