pub mod add_inventory;
pub mod create;
pub mod delete;
pub mod replace_inventory;
pub mod update;

pub use add_inventory::{AddInventoryCommand, AddInventoryError};
pub use create::{CreateHospitalCommand, CreateHospitalError};
pub use delete::{DeleteHospitalCommand, DeleteHospitalError, DeleteHospitalResponse};
pub use replace_inventory::{
    ReplaceInventoryCommand, ReplaceInventoryError, ReplaceInventoryResponse,
};
pub use update::{UpdateHospitalCommand, UpdateHospitalError};
