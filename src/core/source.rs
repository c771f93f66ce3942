//! The adapter contract every rate source implements

use crate::core::error::SourceUnavailable;
use crate::core::rate::{DateRange, RateSeries, SourceKind};
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Provenance tag stamped on every observation this source returns.
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, range: DateRange) -> Result<RateSeries, SourceUnavailable>;
}
