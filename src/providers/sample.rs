//! Synthetic TRM series used when no live source answers.

use crate::core::config::SampleConfig;
use crate::core::{DateRange, RateSeries, SourceKind};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Pull towards the baseline applied on every step of the walk.
const MEAN_REVERSION: f64 = 0.1;
/// Lowest rate the walk may reach, as a fraction of the baseline.
const FLOOR_RATIO: f64 = 0.01;
/// Largest usable baseline; keeps `2 * volatility` finite for the sampler.
const MAX_BASELINE: f64 = 1e12;

#[derive(Debug, Clone)]
pub struct SampleGenerator {
    config: SampleConfig,
}

impl SampleGenerator {
    pub fn new(config: SampleConfig) -> Self {
        SampleGenerator { config }
    }

    /// One observation per calendar day in `range`, tagged
    /// [`SourceKind::Synthetic`]. Deterministic for a given seed and range.
    pub fn generate(&self, range: DateRange) -> RateSeries {
        let baseline = if self.config.baseline.is_finite() {
            self.config.baseline.abs().clamp(1.0, MAX_BASELINE)
        } else {
            SampleConfig::default().baseline
        };
        // Daily shocks never exceed the baseline itself
        let volatility = if self.config.volatility.is_finite() {
            self.config.volatility.abs().min(baseline)
        } else {
            0.0
        };
        let floor = baseline * FLOOR_RATIO;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut rate = baseline;
        let points: Vec<(NaiveDate, f64)> = range
            .days()
            .map(|date| {
                let point = (date, rate);
                let shock = if volatility > 0.0 {
                    rng.gen_range(-volatility..=volatility)
                } else {
                    0.0
                };
                rate = (rate + MEAN_REVERSION * (baseline - rate) + shock).max(floor);
                point
            })
            .collect();

        debug!(
            "Generated {} synthetic observations for {}",
            points.len(),
            range
        );

        RateSeries::synthetic(points)
    }
}
