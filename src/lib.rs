pub mod cli;
pub mod core;
pub mod pipeline;
pub mod providers;

use crate::core::DateRange;
use crate::core::config::AppConfig;
use crate::pipeline::FallbackOrchestrator;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info};

/// Days shown when no start date is given.
pub const DEFAULT_RANGE_DAYS: u64 = 30;

pub enum AppCommand {
    Fetch,
    Summary,
    Weekly,
    Export { output: Option<PathBuf> },
}

/// Fills in missing bounds: `end` defaults to today and `start` to
/// [`DEFAULT_RANGE_DAYS`] days ending on `end`.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| DateRange::last_days(end, DEFAULT_RANGE_DAYS).start());
    (start, end)
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    info!("TRM starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let (start, end) = resolve_range(start, end, Local::now().date_naive());
    let orchestrator = FallbackOrchestrator::from_config(&config);
    let fetch = cli::fetch_with_progress(&orchestrator, start, end).await?;

    match command {
        AppCommand::Fetch => cli::fetch::run(&fetch),
        AppCommand::Summary => cli::summary::run(&fetch),
        AppCommand::Weekly => cli::weekly::run(&fetch),
        AppCommand::Export { output } => {
            cli::export::run(&fetch, output.as_deref(), &config.export_dir).map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_resolve_range_defaults_to_last_30_days() {
        let today = date("2024-03-31");
        assert_eq!(
            resolve_range(None, None, today),
            (date("2024-03-02"), today)
        );
        assert_eq!(
            resolve_range(None, Some(date("2024-01-30")), today),
            (date("2024-01-01"), date("2024-01-30"))
        );
        assert_eq!(
            resolve_range(Some(date("2024-03-20")), None, today),
            (date("2024-03-20"), today)
        );
    }
}
