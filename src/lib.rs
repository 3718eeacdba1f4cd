// Pelagica Server
// Config and theme backend for the Pelagica Jellyfin client

pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
