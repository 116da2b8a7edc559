//! Device tokens module - registration and lifecycle of push targets.

mod devices_model;
mod devices_service;
mod devices_traits;

#[cfg(test)]
pub(crate) mod testing;

pub use devices_model::{DeviceToken, RegisterDeviceToken};
pub use devices_service::DeviceTokenService;
pub use devices_traits::{DeviceTokenRepositoryTrait, DeviceTokenServiceTrait};
