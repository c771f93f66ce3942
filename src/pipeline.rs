//! Ordered fallback across the live TRM sources.
//!
//! Sources are tried one at a time in priority order and the first non-empty
//! series wins. Every failure becomes a warning for the caller. When all live
//! sources fail the synthetic generator answers, so a valid range always
//! yields a renderable series.

use crate::core::config::AppConfig;
use crate::core::{
    DateRange, PipelineError, RateSeries, RateSource, SourceKind, SourceUnavailable,
};
use crate::providers::central_bank::CentralBankProvider;
use crate::providers::open_data::OpenDataProvider;
use crate::providers::sample::SampleGenerator;
use crate::providers::scraping::ScrapingProvider;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Series handed to the presentation layer plus why earlier sources were
/// skipped.
#[derive(Debug, Clone)]
pub struct RateFetch {
    pub series: RateSeries,
    /// One entry per failed live source, in the order they were attempted.
    pub warnings: Vec<String>,
}

impl RateFetch {
    pub fn source_kind(&self) -> SourceKind {
        self.series.source_kind()
    }

    pub fn is_live(&self) -> bool {
        self.source_kind().is_live()
    }

    /// User-facing banner for data that is not real.
    pub fn notice(&self) -> Option<String> {
        (!self.is_live()).then(|| {
            format!(
                "All {} live sources failed; showing synthetic sample data, not real TRM values",
                self.warnings.len()
            )
        })
    }
}

pub struct FallbackOrchestrator {
    sources: Vec<Arc<dyn RateSource>>,
    generator: SampleGenerator,
}

impl FallbackOrchestrator {
    /// `sources` are tried in the given order.
    pub fn new(sources: Vec<Arc<dyn RateSource>>, generator: SampleGenerator) -> Self {
        Self { sources, generator }
    }

    /// Open data first, then the central bank, then scraping.
    pub fn from_config(config: &AppConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let providers = &config.providers;
        let sources: Vec<Arc<dyn RateSource>> = vec![
            Arc::new(OpenDataProvider::new(&providers.open_data, timeout)),
            Arc::new(CentralBankProvider::new(&providers.central_bank, timeout)),
            Arc::new(ScrapingProvider::new(&providers.scraping, timeout)),
        ];
        Self::new(sources, SampleGenerator::new(config.sample.clone()))
    }

    pub fn source_chain(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub async fn get_rate_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateFetch, PipelineError> {
        self.get_rate_series_with(start, end, &|_| {}).await
    }

    /// Same as [`get_rate_series`](Self::get_rate_series), calling
    /// `on_attempt` before each live source is tried.
    #[instrument(name = "RateFetch", skip(self, on_attempt))]
    pub async fn get_rate_series_with(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        on_attempt: &(dyn Fn(SourceKind) + Send + Sync),
    ) -> Result<RateFetch, PipelineError> {
        let range = DateRange::new(start, end)?;
        let mut warnings = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let kind = source.kind();
            on_attempt(kind);
            debug!("Trying {} source for {}", kind, range);

            match self.attempt(source.as_ref(), range).await {
                Ok(series) => {
                    if !warnings.is_empty() {
                        info!(
                            "Source fallback succeeded with {} after {} failed attempt(s)",
                            kind,
                            warnings.len()
                        );
                    }
                    debug!("Using {} observations from {}", series.len(), kind);
                    return Ok(RateFetch { series, warnings });
                }
                Err(err) => {
                    warn!("{}", err);
                    warnings.push(err.to_string());
                }
            }
        }

        warn!(
            "All {} live sources failed for {}, generating sample data",
            self.sources.len(),
            range
        );
        Ok(RateFetch {
            series: self.generator.generate(range),
            warnings,
        })
    }

    /// One bounded try: the series is clipped to the range, and an empty
    /// result is a failure like any other.
    async fn attempt(
        &self,
        source: &dyn RateSource,
        range: DateRange,
    ) -> Result<RateSeries, SourceUnavailable> {
        let series = source.fetch(range).await?.clip(&range);
        if series.is_empty() {
            return Err(SourceUnavailable::new(
                source.kind(),
                format!("returned no observations within {range}"),
            ));
        }
        Ok(series)
    }
}
