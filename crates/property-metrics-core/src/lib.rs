pub mod error;
pub mod format;
pub mod parse;
pub mod ratios;
pub mod schedule;
pub mod tables;
pub mod time_value;
pub mod types;

#[cfg(feature = "lettings")]
pub mod lettings;

#[cfg(feature = "bridging")]
pub mod finance;

#[cfg(feature = "planning")]
pub mod planning;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "short_let")]
pub mod short_let;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::PropertyMetricsError;
pub use tables::{RateTableProvider, RateTables};
pub use types::*;

/// Standard result type for fallible engine operations (parsing, table loading)
pub type PropertyMetricsResult<T> = Result<T, PropertyMetricsError>;
