//! Banco de la República adapter.
//!
//! The endpoint has served the same history as JSON, as CSV and as Excel
//! workbooks of both generations, and neither the URL nor the `Content-Type`
//! header reliably says which one. The raw body is therefore run through an
//! explicit, ordered list of known parsers, each bound to one engine; the
//! first one that accepts the whole document wins.

use crate::core::config::{CentralBankProviderConfig, DocumentFormat};
use crate::core::{DateRange, RateSeries, RateSource, SourceKind, SourceUnavailable};
use crate::providers::util::{fetch_bytes, http_client, preview_bytes};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, instrument};

const DATE_COLUMNS: [&str; 2] = ["date", "fecha"];
const VALUE_COLUMNS: [&str; 3] = ["value", "valor", "trm"];

pub struct CentralBankProvider {
    base_url: String,
    formats: Vec<DocumentFormat>,
    timeout: Duration,
}

impl CentralBankProvider {
    pub fn new(config: &CentralBankProviderConfig, timeout: Duration) -> Self {
        CentralBankProvider {
            base_url: config.base_url.clone(),
            formats: config.formats.clone(),
            timeout,
        }
    }

    async fn fetch_series(&self, range: DateRange) -> Result<RateSeries> {
        let url = format!("{}/estadisticas/trm", self.base_url);
        let query = [
            ("from", range.start().to_string()),
            ("to", range.end().to_string()),
        ];

        let client = http_client(self.timeout)?;
        let body = fetch_bytes(&client, &url, &query).await?;

        let (format, points) = parse_with_formats(&self.formats, &body)?;
        debug!("Parsed {} central bank rows as {}", points.len(), format);

        let points = points.into_iter().filter(|(date, _)| range.contains(*date));
        Ok(RateSeries::from_points(SourceKind::CentralBank, points)?)
    }
}

/// Tries each format in order and fails fast if none accepts the body.
fn parse_with_formats(
    formats: &[DocumentFormat],
    body: &[u8],
) -> Result<(DocumentFormat, Vec<(NaiveDate, f64)>)> {
    if formats.is_empty() {
        return Err(anyhow!("No document formats configured"));
    }

    let mut attempts = Vec::with_capacity(formats.len());
    for format in formats {
        match parse_document(*format, body) {
            Ok(points) => return Ok((*format, points)),
            Err(e) => {
                debug!("Body is not {}: {:#}", format, e);
                attempts.push(format!("{format}: {e:#}"));
            }
        }
    }

    Err(anyhow!(
        "No known document format matched ({}). Response: '{}'",
        attempts.join("; "),
        preview_bytes(body)
    ))
}

fn parse_document(format: DocumentFormat, body: &[u8]) -> Result<Vec<(NaiveDate, f64)>> {
    match format {
        DocumentFormat::Json => parse_json(as_text(body)?),
        DocumentFormat::Csv => parse_csv(as_text(body)?, b',', false),
        DocumentFormat::CsvSemicolon => parse_csv(as_text(body)?, b';', true),
        DocumentFormat::Xlsx => parse_xlsx(body),
        DocumentFormat::Xls => parse_xls(body),
    }
}

fn as_text(body: &[u8]) -> Result<&str> {
    std::str::from_utf8(body).context("Body is not UTF-8 text")
}

#[derive(Debug, Deserialize)]
struct BanrepRecord {
    date: String,
    value: f64,
}

fn parse_json(body: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let records: Vec<BanrepRecord> = serde_json::from_str(body).context("Invalid JSON records")?;
    records
        .into_iter()
        .map(|r| Ok((parse_date(&r.date)?, r.value)))
        .collect()
}

fn find_column<'a>(headers: impl IntoIterator<Item = &'a str>, names: &[&str]) -> Option<usize> {
    headers
        .into_iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn parse_csv(body: &str, delimiter: u8, decimal_comma: bool) -> Result<Vec<(NaiveDate, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers().context("Missing header row")?.clone();
    let date_idx = find_column(headers.iter(), DATE_COLUMNS.as_slice())
        .ok_or_else(|| anyhow!("No date column in header"))?;
    let value_idx = find_column(headers.iter(), VALUE_COLUMNS.as_slice())
        .ok_or_else(|| anyhow!("No value column in header"))?;

    let mut points = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed row {}", line + 2))?;
        let date = record
            .get(date_idx)
            .ok_or_else(|| anyhow!("Row {} has no date", line + 2))?;
        let value = record
            .get(value_idx)
            .ok_or_else(|| anyhow!("Row {} has no value", line + 2))?;
        points.push((parse_date(date)?, parse_amount(value, decimal_comma)?));
    }
    Ok(points)
}

/// Opened with the OOXML reader only; an `.xls` body is rejected here.
fn parse_xlsx(body: &[u8]) -> Result<Vec<(NaiveDate, f64)>> {
    let mut workbook = Xlsx::new(Cursor::new(body)).context("Not an XLSX workbook")?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no sheets"))?
        .context("Unreadable first sheet")?;
    parse_sheet(&sheet)
}

/// Opened with the BIFF reader only; an `.xlsx` body is rejected here.
fn parse_xls(body: &[u8]) -> Result<Vec<(NaiveDate, f64)>> {
    let mut workbook = Xls::new(Cursor::new(body)).context("Not an XLS workbook")?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no sheets"))?
        .context("Unreadable first sheet")?;
    parse_sheet(&sheet)
}

/// First row is the header; blank rows are skipped.
fn parse_sheet(sheet: &Range<Data>) -> Result<Vec<(NaiveDate, f64)>> {
    let mut rows = sheet.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("Empty sheet"))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    let date_idx = find_column(header.iter().map(String::as_str), DATE_COLUMNS.as_slice())
        .ok_or_else(|| anyhow!("No date column in header"))?;
    let value_idx = find_column(header.iter().map(String::as_str), VALUE_COLUMNS.as_slice())
        .ok_or_else(|| anyhow!("No value column in header"))?;

    let mut points = Vec::new();
    for (line, row) in rows.enumerate() {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let date = row
            .get(date_idx)
            .ok_or_else(|| anyhow!("missing date cell"))
            .and_then(cell_date)
            .with_context(|| format!("Row {}", line + 2))?;
        let value = row
            .get(value_idx)
            .ok_or_else(|| anyhow!("missing value cell"))
            .and_then(cell_amount)
            .with_context(|| format!("Row {}", line + 2))?;
        points.push((date, value));
    }
    Ok(points)
}

fn cell_date(cell: &Data) -> Result<NaiveDate> {
    match cell {
        Data::String(text) => parse_date(text.trim()),
        other => other
            .as_date()
            .ok_or_else(|| anyhow!("Unrecognised date cell: {other:?}")),
    }
}

fn cell_amount(cell: &Data) -> Result<f64> {
    match cell {
        Data::Float(value) => Ok(*value),
        Data::Int(value) => Ok(*value as f64),
        Data::String(text) => parse_amount(text, false).or_else(|_| parse_amount(text, true)),
        other => Err(anyhow!("Invalid amount cell: {other:?}")),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .with_context(|| format!("Unrecognised date: '{value}'"))
}

fn parse_amount(value: &str, decimal_comma: bool) -> Result<f64> {
    let cleaned = value.trim().trim_start_matches('$').trim();
    let normalized = if decimal_comma {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    normalized
        .parse::<f64>()
        .with_context(|| format!("Invalid amount: '{value}'"))
}

#[async_trait]
impl RateSource for CentralBankProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::CentralBank
    }

    #[instrument(name = "CentralBankFetch", skip_all, fields(range = %range))]
    async fn fetch(&self, range: DateRange) -> Result<RateSeries, SourceUnavailable> {
        self.fetch_series(range)
            .await
            .map_err(|e| SourceUnavailable::from_error(self.kind(), &e))
    }
}
