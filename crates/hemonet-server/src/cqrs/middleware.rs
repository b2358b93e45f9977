//! CQRS marker traits
//!
//! Distinguish write commands from read queries at the type level. Every
//! command or query struct implements exactly one of these alongside its
//! `mediator::Request` impl.

/// Marker for write operations (create, update, delete, sweep)
pub trait Command {}

/// Marker for read operations (get, list, aggregate)
pub trait Query {}
