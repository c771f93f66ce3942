//! Provides summary statistics and weekly aggregation over a rate series.
use crate::core::rate::RateSeries;
use chrono::{Datelike, Days, NaiveDate};

/// Headline figures for a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub latest: f64,
    pub latest_date: NaiveDate,
    /// Latest rate minus the previous observation, if there is one.
    pub change: Option<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Open/high/low/close of one calendar week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyCandle {
    /// The Sunday that closes the week.
    pub week_ending: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Returns `None` for an empty series.
pub fn summarize(series: &RateSeries) -> Option<SeriesSummary> {
    let observations = series.observations();
    let last = observations.last()?;

    let (sum, min, max) = observations.iter().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), o| (sum + o.rate, min.min(o.rate), max.max(o.rate)),
    );
    let change = observations
        .len()
        .checked_sub(2)
        .map(|idx| last.rate - observations[idx].rate);

    Some(SeriesSummary {
        latest: last.rate,
        latest_date: last.date,
        change,
        mean: sum / observations.len() as f64,
        min,
        max,
        count: observations.len(),
    })
}

/// Sunday on or after `date`.
fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + Days::new(days_to_sunday as u64)
}

/// Buckets observations into Monday-to-Sunday weeks. Weeks without
/// observations are omitted.
pub fn weekly_ohlc(series: &RateSeries) -> Vec<WeeklyCandle> {
    let mut candles: Vec<WeeklyCandle> = Vec::new();
    for observation in series.observations() {
        let week = week_ending(observation.date);
        match candles.last_mut() {
            Some(candle) if candle.week_ending == week => {
                candle.high = candle.high.max(observation.rate);
                candle.low = candle.low.min(observation.rate);
                candle.close = observation.rate;
            }
            _ => candles.push(WeeklyCandle {
                week_ending: week,
                open: observation.rate,
                high: observation.rate,
                low: observation.rate,
                close: observation.rate,
            }),
        }
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::SourceKind;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> RateSeries {
        RateSeries::from_points(
            SourceKind::OpenData,
            points.iter().map(|(d, r)| (date(d), *r)),
        )
        .unwrap()
    }

    #[test]
    fn test_summarize() {
        let s = series(&[
            ("2024-01-02", 3900.0),
            ("2024-01-03", 3800.0),
            ("2024-01-04", 4000.0),
            ("2024-01-05", 3950.0),
        ]);

        let summary = summarize(&s).unwrap();
        assert_eq!(summary.latest, 3950.0);
        assert_eq!(summary.latest_date, date("2024-01-05"));
        assert_eq!(summary.change, Some(-50.0));
        assert!((summary.mean - 3912.5).abs() < 1e-9);
        assert_eq!(summary.min, 3800.0);
        assert_eq!(summary.max, 4000.0);
        assert_eq!(summary.count, 4);
    }

    #[test]
    fn test_summarize_single_and_empty() {
        let single = summarize(&series(&[("2024-01-02", 3900.0)])).unwrap();
        assert_eq!(single.change, None);
        assert_eq!(single.mean, 3900.0);

        assert!(summarize(&series(&[])).is_none());
    }

    #[test]
    fn test_week_ending_is_sunday() {
        // 2024-01-07 is a Sunday
        assert_eq!(week_ending(date("2024-01-01")), date("2024-01-07"));
        assert_eq!(week_ending(date("2024-01-06")), date("2024-01-07"));
        assert_eq!(week_ending(date("2024-01-07")), date("2024-01-07"));
        assert_eq!(week_ending(date("2024-01-08")), date("2024-01-14"));
    }

    #[test]
    fn test_weekly_ohlc() {
        let s = series(&[
            ("2024-01-02", 3900.0),
            ("2024-01-03", 3800.0),
            ("2024-01-05", 4000.0),
            ("2024-01-07", 3950.0),
            ("2024-01-09", 3960.0),
            ("2024-01-22", 3700.0),
        ]);

        let candles = weekly_ohlc(&s);
        assert_eq!(
            candles,
            vec![
                WeeklyCandle {
                    week_ending: date("2024-01-07"),
                    open: 3900.0,
                    high: 4000.0,
                    low: 3800.0,
                    close: 3950.0,
                },
                WeeklyCandle {
                    week_ending: date("2024-01-14"),
                    open: 3960.0,
                    high: 3960.0,
                    low: 3960.0,
                    close: 3960.0,
                },
                WeeklyCandle {
                    week_ending: date("2024-01-28"),
                    open: 3700.0,
                    high: 3700.0,
                    low: 3700.0,
                    close: 3700.0,
                },
            ]
        );
    }
}
