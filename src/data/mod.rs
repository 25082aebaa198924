pub mod config_source;
pub mod loader;
pub mod queue;
pub mod store;
pub mod transport;
