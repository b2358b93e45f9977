//! Feature modules implementing the Hemonet API
//!
//! This module contains all feature slices following the CQRS (Command
//! Query Responsibility Segregation) pattern. Each feature is organized as
//! a vertical slice with its own commands, queries, and routes.
//!
//! # Features
//!
//! - **hospitals**: hospital CRUD, inventory replace/add, listing, nearby
//!   search, and the cross-hospital blood summary
//! - **blood_units**: authoritative blood unit CRUD, filtered listing, and
//!   the on-demand expiry sweep
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete, sweep)
//! - `queries/` - Read operations (get, list, aggregate)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types (if needed)
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod blood_units;
pub mod hospitals;
pub mod shared;

use axum::Router;
use sqlx::PgPool;

/// Creates the main API router with all feature routes mounted
///
/// Each feature is mounted under its own path prefix:
/// - `/hospitals` - Hospital management, nearby search, blood summary
/// - `/blood-units` - Blood unit store operations and the expiry sweep
pub fn router(db: PgPool) -> Router<()> {
    Router::new()
        .nest(
            "/hospitals",
            hospitals::hospitals_routes().with_state(db.clone()),
        )
        .nest(
            "/blood-units",
            blood_units::blood_units_routes().with_state(db),
        )
}
