pub mod create;
pub mod delete;
pub mod remove_expired;
pub mod update;

pub use create::{CreateBloodUnitCommand, CreateBloodUnitError};
pub use delete::{DeleteBloodUnitCommand, DeleteBloodUnitError, DeleteBloodUnitResponse};
pub use remove_expired::{RemoveExpiredCommand, RemoveExpiredError, RemoveExpiredResponse};
pub use update::{UpdateBloodUnitCommand, UpdateBloodUnitError};
