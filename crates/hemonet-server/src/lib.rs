//! Hemonet Server Library
//!
//! HTTP server for hospital blood inventory management.
//!
//! # Overview
//!
//! The Hemonet server keeps a hospital network's blood stock correct across
//! two representations and answers queries over it:
//!
//! - **Authoritative store**: the `blood_units` table, one row per trackable
//!   quantity of a blood type/component with an expiration timestamp
//! - **Read-optimized snapshot**: a denormalized JSONB copy of each
//!   hospital's units embedded in its `hospitals` row, kept in sync after
//!   every authoritative write
//! - **Queries**: filtered and paginated listings, nearest-hospital search,
//!   and cross-hospital blood totals
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! architecture. Each feature is a vertical slice with its own commands
//! (write operations), queries (read operations), and routes:
//!
//! - **hospitals**: hospital CRUD, inventory replace/add, listing, nearby
//!   search, and the blood summary aggregation
//! - **blood_units**: authoritative unit CRUD, the filtered unit listing,
//!   and the on-demand expiry sweep
//!
//! Write handlers validate their full input before touching the database,
//! mutate the authoritative store first, then propagate the change into the
//! owning hospital's snapshot. A snapshot write failing after a committed
//! store write is logged and tolerated; the snapshot is stale until an
//! external reconciliation pass rebuilds it.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access with runtime-bound queries
//! - **Tower**: middleware (CORS, tracing, compression)

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod features;
pub mod middleware;
pub mod models;
