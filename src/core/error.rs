//! Error kinds shared by the adapters and the fallback pipeline

use crate::core::rate::SourceKind;
use chrono::NaiveDate;
use thiserror::Error;

/// A live source could not produce a usable series.
///
/// Covers network failures, timeouts, bad HTTP statuses, unparsable bodies and
/// empty results. The pipeline recovers from it by trying the next source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} source unavailable: {reason}")]
pub struct SourceUnavailable {
    pub kind: SourceKind,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Flattens an `anyhow` context chain into the reason.
    pub fn from_error(kind: SourceKind, err: &anyhow::Error) -> Self {
        Self::new(kind, format!("{err:#}"))
    }
}

/// Errors surfaced to callers of the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Violations of the [`RateSeries`](crate::core::RateSeries) invariants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    #[error("rate for {date} must be a positive number, got {rate}")]
    InvalidRate { date: NaiveDate, rate: f64 },
}
