pub mod error;
pub mod loader;
pub mod store;
pub mod weather_snapshot;
