mod model;
mod repository;

pub use model::DeviceTokenDB;
pub use repository::DeviceTokenRepository;
