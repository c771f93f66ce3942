//! CSV export of a rate series as plain `date,trm` rows.

use crate::core::rate::RateSeries;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_FILE_NAME: &str = "trm_data.csv";
const HEADER: [&str; 2] = ["date", "trm"];

/// Writes the series as CSV. Rates use the shortest representation that
/// parses back to the same `f64`.
pub fn write_csv<W: Write>(series: &RateSeries, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for (date, rate) in series.points() {
        wtr.write_record([date.format("%Y-%m-%d").to_string(), rate.to_string()])?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn to_csv_string(series: &RateSeries) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(series, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Reads back `(date, rate)` pairs written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<(NaiveDate, f64)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().context("Missing CSV header")?;
    if headers.iter().ne(HEADER) {
        return Err(anyhow!("Unexpected CSV header: {:?}", headers));
    }

    rdr.records()
        .enumerate()
        .map(|(idx, record)| {
            let record = record.with_context(|| format!("Malformed CSV row {}", idx + 2))?;
            let date = NaiveDate::parse_from_str(&record[0], "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}'", &record[0]))?;
            let rate = record[1]
                .parse::<f64>()
                .with_context(|| format!("Invalid rate '{}'", &record[1]))?;
            Ok((date, rate))
        })
        .collect()
}

/// Saves the series under `dir`, creating it if needed, and returns the path.
pub fn save_csv(series: &RateSeries, dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    write_csv(series, file)?;
    info!("Saved {} observations to {}", series.len(), path.display());
    Ok(path)
}
