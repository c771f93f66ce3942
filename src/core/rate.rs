//! Rate observations, series and the date ranges they cover

use crate::core::error::{PipelineError, SeriesError};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    OpenData,
    CentralBank,
    Scraped,
    Synthetic,
}

impl SourceKind {
    pub fn is_live(&self) -> bool {
        !matches!(self, SourceKind::Synthetic)
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourceKind::OpenData => "open data",
                SourceKind::CentralBank => "central bank",
                SourceKind::Scraped => "web scraping",
                SourceKind::Synthetic => "synthetic sample",
            }
        )
    }
}

/// Inclusive calendar date range. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PipelineError> {
        if start > end {
            return Err(PipelineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending on `today`, inclusive.
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let start = today
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn num_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// One daily TRM value in COP per 1 USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub rate: f64,
    pub source_kind: SourceKind,
}

/// Ordered daily rates from a single source.
///
/// Observations are sorted ascending by date, carry unique dates and strictly
/// positive rates, and all share the series' [`SourceKind`].
/// [`RateSeries::from_points`] enforces this for data read from a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSeries {
    source_kind: SourceKind,
    observations: Vec<RateObservation>,
}

impl RateSeries {
    /// Builds a series from raw `(date, rate)` points in any order.
    ///
    /// When a date repeats, the first occurrence in input order wins.
    pub fn from_points(
        source_kind: SourceKind,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let mut observations = Vec::new();
        for (date, rate) in points {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(SeriesError::InvalidRate { date, rate });
            }
            observations.push(RateObservation {
                date,
                rate,
                source_kind,
            });
        }

        // Stable sort keeps input order among equal dates for dedup
        observations.sort_by_key(|o| o.date);
        observations.dedup_by_key(|o| o.date);

        Ok(Self {
            source_kind,
            observations,
        })
    }

    /// Generated data: dates come from [`DateRange::days`] and rates are
    /// floored above zero, so the invariants hold by construction.
    pub(crate) fn synthetic(points: Vec<(NaiveDate, f64)>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(points.iter().all(|(_, rate)| *rate > 0.0));
        let observations = points
            .into_iter()
            .map(|(date, rate)| RateObservation {
                date,
                rate,
                source_kind: SourceKind::Synthetic,
            })
            .collect();
        Self {
            source_kind: SourceKind::Synthetic,
            observations,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn observations(&self) -> &[RateObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&RateObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&RateObservation> {
        self.observations.last()
    }

    /// Plain `(date, rate)` pairs, the shape consumers export and chart.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.observations.iter().map(|o| (o.date, o.rate))
    }

    /// Drops observations outside `range`.
    pub fn clip(self, range: &DateRange) -> Self {
        let observations = self
            .observations
            .into_iter()
            .filter(|o| range.contains(o.date))
            .collect();
        Self {
            source_kind: self.source_kind,
            observations,
        }
    }
}
