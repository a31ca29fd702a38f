//! Core business logic abstractions

pub mod convert;
pub mod rate;

// Re-export main types for cleaner imports
pub use convert::{ConversionRecord, Converter};
pub use rate::{ExchangeRate, RateMap, RateSource, SourceError};
