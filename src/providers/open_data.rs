//! Socrata open-data adapter for the official TRM dataset on datos.gov.co

use crate::core::config::OpenDataProviderConfig;
use crate::core::{DateRange, RateSeries, RateSource, SourceKind, SourceUnavailable};
use crate::providers::util::{fetch_text, http_client, preview};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct OpenDataProvider {
    base_url: String,
    dataset: String,
    limit: u32,
    timeout: Duration,
}

impl OpenDataProvider {
    pub fn new(config: &OpenDataProviderConfig, timeout: Duration) -> Self {
        OpenDataProvider {
            base_url: config.base_url.clone(),
            dataset: config.dataset.clone(),
            limit: config.limit,
            timeout,
        }
    }

    async fn fetch_series(&self, range: DateRange) -> Result<RateSeries> {
        let url = format!("{}/resource/{}.json", self.base_url, self.dataset);
        let query = [
            (
                "$where",
                format!(
                    "vigenciadesde between '{}T00:00:00' and '{}T23:59:59'",
                    range.start(),
                    range.end()
                ),
            ),
            ("$order", "vigenciadesde ASC".to_string()),
            ("$limit", self.limit.to_string()),
        ];

        let client = http_client(self.timeout)?;
        let text = fetch_text(&client, &url, &query).await?;

        let records: Vec<TrmRecord> = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse open data response. Response: '{}'", preview(&text))
        })?;
        debug!("Open data returned {} records", records.len());

        let points = records
            .iter()
            .map(TrmRecord::to_point)
            .collect::<Result<Vec<_>>>()?;

        Ok(RateSeries::from_points(SourceKind::OpenData, points)?)
    }
}

/// One row of the Socrata dataset. Socrata serialises numbers as strings.
#[derive(Debug, Deserialize)]
struct TrmRecord {
    valor: SocrataNumber,
    vigenciadesde: String,
    unidad: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SocrataNumber {
    Text(String),
    Number(f64),
}

impl TrmRecord {
    fn to_point(&self) -> Result<(NaiveDate, f64)> {
        if let Some(unit) = &self.unidad
            && unit != "COP"
        {
            return Err(anyhow!(
                "Unexpected unit '{}' for record dated '{}'",
                unit,
                self.vigenciadesde
            ));
        }

        let date = parse_floating_timestamp(&self.vigenciadesde)?;
        let rate = match &self.valor {
            SocrataNumber::Number(n) => *n,
            SocrataNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid rate '{s}' for {date}"))?,
        };
        Ok((date, rate))
    }
}

/// Socrata floating timestamps look like `2024-01-02T00:00:00.000`.
fn parse_floating_timestamp(value: &str) -> Result<NaiveDate> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .with_context(|| format!("Unrecognised date format: '{value}'"))
}

#[async_trait]
impl RateSource for OpenDataProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenData
    }

    #[instrument(name = "OpenDataFetch", skip_all, fields(range = %range))]
    async fn fetch(&self, range: DateRange) -> Result<RateSeries, SourceUnavailable> {
        self.fetch_series(range)
            .await
            .map_err(|e| SourceUnavailable::from_error(self.kind(), &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(date("2024-01-01"), date("2024-01-05")).unwrap()
    }

    async fn create_open_data_mock_server(mock_response: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/32sa-8pi3.json"))
            .and(query_param("$order", "vigenciadesde ASC"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(base_url: &str) -> OpenDataProvider {
        let config = OpenDataProviderConfig {
            base_url: base_url.to_string(),
            dataset: "32sa-8pi3".to_string(),
            limit: 5000,
        };
        OpenDataProvider::new(&config, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_successful_open_data_fetch() {
        let mock_response = r#"[
            {"valor": "3822.05", "unidad": "COP", "vigenciadesde": "2024-01-02T00:00:00.000", "vigenciahasta": "2024-01-02T00:00:00.000"},
            {"valor": "3875.61", "unidad": "COP", "vigenciadesde": "2024-01-03T00:00:00.000", "vigenciahasta": "2024-01-03T00:00:00.000"},
            {"valor": "3891.7", "unidad": "COP", "vigenciadesde": "2024-01-04T00:00:00.000", "vigenciahasta": "2024-01-04T00:00:00.000"}
        ]"#;
        let mock_server = create_open_data_mock_server(mock_response, 200).await;

        let series = provider(&mock_server.uri()).fetch(range()).await.unwrap();

        assert_eq!(series.source_kind(), SourceKind::OpenData);
        let points: Vec<_> = series.points().collect();
        assert_eq!(
            points,
            vec![
                (date("2024-01-02"), 3822.05),
                (date("2024-01-03"), 3875.61),
                (date("2024-01-04"), 3891.7),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_data_sends_date_filter() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/32sa-8pi3.json"))
            .and(query_param(
                "$where",
                "vigenciadesde between '2024-01-01T00:00:00' and '2024-01-05T23:59:59'",
            ))
            .and(query_param("$limit", "5000"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"valor": 4000.0, "vigenciadesde": "2024-01-01T00:00:00"}]"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let series = provider(&mock_server.uri()).fetch(range()).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().rate, 4000.0);
    }

    #[tokio::test]
    async fn test_open_data_empty_array_is_empty_series() {
        let mock_server = create_open_data_mock_server("[]", 200).await;
        let series = provider(&mock_server.uri()).fetch(range()).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_open_data_renamed_fields_fail() {
        let mock_response = r#"[{"value": "3822.05", "fecha": "2024-01-02T00:00:00.000"}]"#;
        let mock_server = create_open_data_mock_server(mock_response, 200).await;

        let err = provider(&mock_server.uri()).fetch(range()).await.unwrap_err();
        assert_eq!(err.kind, SourceKind::OpenData);
        assert!(
            err.reason.contains("Failed to parse open data response"),
            "{}",
            err.reason
        );
    }

    #[tokio::test]
    async fn test_open_data_unexpected_date_format_fails() {
        let mock_response = r#"[{"valor": "3822.05", "vigenciadesde": "02/01/2024"}]"#;
        let mock_server = create_open_data_mock_server(mock_response, 200).await;

        let err = provider(&mock_server.uri()).fetch(range()).await.unwrap_err();
        assert!(
            err.reason
                .contains("Unrecognised date format: '02/01/2024'"),
            "{}",
            err.reason
        );
    }

    #[tokio::test]
    async fn test_open_data_wrong_unit_fails() {
        let mock_response = r#"[{"valor": "1.08", "unidad": "EUR", "vigenciadesde": "2024-01-02T00:00:00.000"}]"#;
        let mock_server = create_open_data_mock_server(mock_response, 200).await;

        let err = provider(&mock_server.uri()).fetch(range()).await.unwrap_err();
        assert!(err.reason.contains("Unexpected unit 'EUR'"), "{}", err.reason);
    }

    #[tokio::test]
    async fn test_open_data_non_positive_rate_fails() {
        let mock_response = r#"[{"valor": "-1", "vigenciadesde": "2024-01-02T00:00:00.000"}]"#;
        let mock_server = create_open_data_mock_server(mock_response, 200).await;

        let err = provider(&mock_server.uri()).fetch(range()).await.unwrap_err();
        assert!(
            err.reason.contains("must be a positive number"),
            "{}",
            err.reason
        );
    }

    #[tokio::test]
    async fn test_open_data_server_error() {
        let mock_server = create_open_data_mock_server("Server Error", 500).await;

        let err = provider(&mock_server.uri()).fetch(range()).await.unwrap_err();
        assert!(err.reason.starts_with("HTTP error: 500"), "{}", err.reason);
    }
}
