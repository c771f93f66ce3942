//! Core business logic abstractions

pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod log;
pub mod rate;
pub mod source;

// Re-export main types for cleaner imports
pub use error::{PipelineError, SeriesError, SourceUnavailable};
pub use rate::{DateRange, RateObservation, RateSeries, SourceKind};
pub use source::RateSource;
