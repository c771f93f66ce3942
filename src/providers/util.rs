use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("trm/", env!("CARGO_PKG_VERSION"));

/// Builds the client every live source uses. The timeout bounds the whole
/// request, so a hung source fails instead of stalling the pipeline.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Performs a GET and returns the raw body, failing on transport errors,
/// non-success statuses and blank bodies.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Vec<u8>> {
    let request_url = reqwest::Url::parse_with_params(url, query)
        .with_context(|| format!("Invalid URL: {url}"))?;
    debug!("Requesting {}", request_url);

    let response = client.get(request_url).send().await.map_err(|e| {
        if e.is_timeout() {
            anyhow!("Request to {} timed out", url)
        } else {
            anyhow!("Request error: {} for URL: {}", e, url)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP error: {} for URL: {}", status, url));
    }

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            anyhow!("Request to {} timed out", url)
        } else {
            anyhow!("Failed to read response body from {}: {}", url, e)
        }
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(anyhow!("Received empty response from {}", url));
    }

    debug!("Received {} bytes from {}", body.len(), url);
    Ok(body.to_vec())
}

/// [`fetch_bytes`] for sources that only ever serve UTF-8 text.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<String> {
    let body = fetch_bytes(client, url, query).await?;
    String::from_utf8(body).with_context(|| format!("Response from {url} is not valid UTF-8"))
}

/// Like [`preview`], but describes non-text bodies instead of printing them.
pub fn preview_bytes(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => preview(text),
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

/// Shortens a response body for inclusion in error messages.
pub fn preview(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text_passes_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .and(query_param("from", "2024-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/rates", mock_server.uri());
        let text = fetch_text(&client, &url, &[("from", "2024-01-01".to_string())])
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/rates", mock_server.uri());
        let err = fetch_text(&client, &url, &[]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("HTTP error: 503 Service Unavailable for URL: {url}")
        );
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_blank_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/rates", mock_server.uri());
        let err = fetch_text(&client, &url, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Received empty response from {url}"));
    }

    #[tokio::test]
    async fn test_fetch_text_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_millis(50)).unwrap();
        let url = format!("{}/rates", mock_server.uri());
        let err = fetch_text(&client, &url, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Request to {url} timed out"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_keeps_binary_body() {
        let body = vec![0x50, 0x4b, 0x03, 0x04, 0xb6, 0x00, 0xff];
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.clone(), "application/octet-stream"),
            )
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/trm.xlsx", mock_server.uri());
        assert_eq!(fetch_bytes(&client, &url, &[]).await.unwrap(), body);

        let err = fetch_text(&client, &url, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Response from {url} is not valid UTF-8"));
    }

    #[test]
    fn test_preview_bytes_describes_binary() {
        assert_eq!(preview_bytes(b"fecha,valor"), "fecha,valor");
        assert_eq!(preview_bytes(&[0x50, 0x4b, 0xb6]), "<3 bytes of binary data>");
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let long = "x".repeat(500);
        let short = preview(&long);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(preview("abc"), "abc");
    }
}
