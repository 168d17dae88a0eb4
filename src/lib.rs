pub mod client;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

pub use crate::core::config::AppConfig;
pub use crate::core::record::RateRecord;
