//! Core business logic: rates, caching and payout arithmetic

pub mod cache;
pub mod config;
pub mod log;
pub mod payout;
pub mod rates;

// Re-export main types for cleaner imports
pub use payout::{CalculationInputs, CalculationResult, InputError};
pub use rates::{RateError, RateLookup, RateOrigin, RateProvider, RateSource, RateTable};
