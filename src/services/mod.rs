// Pelagica Services
// Business logic layer

mod config_store;
mod jellyfin_client;
mod theme_repository;
mod theme_store;
mod theme_validator;

pub use config_store::*;
pub use jellyfin_client::*;
pub use theme_repository::*;
pub use theme_store::*;
pub use theme_validator::*;
