// Pelagica Models
// Data structures for the application

mod app_config;
mod theme;
mod theme_repository;

pub use app_config::*;
pub use theme::*;
pub use theme_repository::*;
