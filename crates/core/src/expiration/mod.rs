//! Expiration module - detect and archive passes over due goals.

mod expiration_service;
mod expiration_traits;

pub use expiration_service::ExpirationService;
pub use expiration_traits::ExpirationServiceTrait;
