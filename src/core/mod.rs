//! Core abstractions shared by the server and the client

pub mod config;
pub mod log;
pub mod rate;
pub mod record;

// Re-export main types for cleaner imports
pub use rate::{Quote, RateProvider};
pub use record::{RateRecord, RateStore, StoreError};
