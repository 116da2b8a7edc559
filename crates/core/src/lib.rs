//! Goaltrack Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for Goaltrack.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod devices;
pub mod errors;
pub mod expiration;
pub mod goals;
pub mod notifications;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
