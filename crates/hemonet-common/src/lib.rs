//! Hemonet Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Hemonet project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all Hemonet workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing setup (console/file, text/JSON)
//! - **Types**: Shared domain types (blood types and components)

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{HemonetError, Result};
pub use types::{BloodComponent, BloodType};
