pub mod export;
pub mod fetch;
pub mod setup;
pub mod summary;
pub mod ui;
pub mod weekly;

use crate::core::SourceKind;
use crate::pipeline::{FallbackOrchestrator, RateFetch};
use anyhow::Result;
use chrono::NaiveDate;

/// Runs the fallback chain behind a progress bar that advances per source.
pub async fn fetch_with_progress(
    orchestrator: &FallbackOrchestrator,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RateFetch> {
    let pb = ui::new_progress_bar(orchestrator.source_chain().len() as u64, true);
    pb.set_message("Fetching TRM...");

    let on_attempt = |kind: SourceKind| {
        pb.set_message(format!("Querying {kind} source..."));
        pb.inc(1);
    };
    let result = orchestrator
        .get_rate_series_with(start, end, &on_attempt)
        .await;
    pb.finish_and_clear();

    Ok(result?)
}

/// Diagnostic lines for skipped sources and synthetic data, in print order.
pub fn fetch_diagnostics(fetch: &RateFetch) -> Vec<String> {
    let mut lines: Vec<String> = fetch
        .warnings
        .iter()
        .map(|warning| ui::style_text(warning, ui::StyleType::Subtle))
        .collect();
    if let Some(notice) = fetch.notice() {
        lines.push(ui::style_text(&notice, ui::StyleType::Error));
    }
    lines
}

/// Writes the diagnostics to stderr; stdout carries only tables and CSV.
pub fn print_fetch_warnings(fetch: &RateFetch) {
    for line in fetch_diagnostics(fetch) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SampleConfig;
    use crate::core::{DateRange, RateSeries, SourceKind};
    use crate::providers::sample::SampleGenerator;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_live_fetch_has_only_source_warnings() {
        let fetch = RateFetch {
            series: RateSeries::from_points(
                SourceKind::Scraped,
                vec![(date("2024-01-02"), 3822.05)],
            )
            .unwrap(),
            warnings: vec!["open data source unavailable: timed out".to_string()],
        };

        let lines = fetch_diagnostics(&fetch);
        assert_eq!(lines.len(), 1);
        assert!(console::strip_ansi_codes(&lines[0]).contains("open data source unavailable"));
    }

    #[test]
    fn test_synthetic_fetch_ends_with_notice() {
        let range = DateRange::new(date("2024-01-01"), date("2024-01-03")).unwrap();
        let fetch = RateFetch {
            series: SampleGenerator::new(SampleConfig::default()).generate(range),
            warnings: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };

        let lines = fetch_diagnostics(&fetch);
        assert_eq!(lines.len(), 4);
        assert!(console::strip_ansi_codes(&lines[3]).starts_with("All 3 live sources failed"));
    }
}
