pub mod awesomeapi;

pub use crate::core::rate::{FetchError, Quote, RateProvider};
pub use awesomeapi::AwesomeApiProvider;
