//! Last-resort live source: the TRM history table on dolar-colombia.com.
//!
//! Tied to the page markup. Any deviation from the expected table layout is a
//! failure of the whole source rather than a partial series.

use crate::core::config::ScrapingProviderConfig;
use crate::core::{DateRange, RateSeries, RateSource, SourceKind, SourceUnavailable};
use crate::providers::util::{fetch_text, http_client};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};

const TABLE_SELECTOR: &str = "table.table";

pub struct ScrapingProvider {
    base_url: String,
    page: String,
    timeout: Duration,
}

impl ScrapingProvider {
    pub fn new(config: &ScrapingProviderConfig, timeout: Duration) -> Self {
        ScrapingProvider {
            base_url: config.base_url.clone(),
            page: config.page.clone(),
            timeout,
        }
    }

    async fn fetch_series(&self, range: DateRange) -> Result<RateSeries> {
        let url = format!("{}{}", self.base_url, self.page);

        let client = http_client(self.timeout)?;
        let html = fetch_text(&client, &url, &[]).await?;

        // Html is not Send, so parsing stays out of the async flow
        let points = parse_history_table(&html)
            .with_context(|| format!("Unexpected page structure at {url}"))?;
        debug!("Scraped {} rows from {}", points.len(), url);

        let points = points.into_iter().filter(|(date, _)| range.contains(*date));
        Ok(RateSeries::from_points(SourceKind::Scraped, points)?)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

/// Extracts `(date, rate)` rows from the first `table.table` on the page.
fn parse_history_table(html: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let document = Html::parse_document(html);
    let table_selector = selector(TABLE_SELECTOR)?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| anyhow!("No '{}' element found", TABLE_SELECTOR))?;

    let mut points = Vec::new();
    for (idx, row) in table.select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        // Header rows carry only <th>
        if cells.is_empty() {
            continue;
        }
        if cells.len() < 2 {
            return Err(anyhow!(
                "Row {} has {} cell(s), expected date and rate",
                idx,
                cells.len()
            ));
        }

        let date_text = cell_text(&cells[0]);
        let rate_text = cell_text(&cells[1]);
        let date = NaiveDate::parse_from_str(&date_text, "%d/%m/%Y")
            .with_context(|| format!("Unrecognised date '{date_text}' in row {idx}"))?;
        let rate = parse_cop_amount(&rate_text)
            .with_context(|| format!("Unrecognised rate '{rate_text}' in row {idx}"))?;
        points.push((date, rate));
    }

    if points.is_empty() {
        return Err(anyhow!("Table '{}' has no data rows", TABLE_SELECTOR));
    }
    Ok(points)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parses Colombian-formatted amounts such as `$4.123,45`.
fn parse_cop_amount(text: &str) -> Result<f64> {
    let normalized = text
        .trim()
        .trim_start_matches('$')
        .trim()
        .replace('.', "")
        .replace(',', ".");
    Ok(normalized.parse::<f64>()?)
}

#[async_trait]
impl RateSource for ScrapingProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::Scraped
    }

    #[instrument(name = "ScrapingFetch", skip_all, fields(range = %range))]
    async fn fetch(&self, range: DateRange) -> Result<RateSeries, SourceUnavailable> {
        self.fetch_series(range)
            .await
            .map_err(|e| SourceUnavailable::from_error(self.kind(), &e))
    }
}
