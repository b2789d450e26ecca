//! HTTP sheet source
//!
//! Talks to a spreadsheet web endpoint that answers with the sheet as CSV.
//! The sheet name and cell range travel as `sheet` and `range` query
//! parameters.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::SheetConfig;
use crate::ports::SheetSource;

/// Fetches CSV over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    client: Client,
    endpoint: Url,
}

impl HttpSheetSource {
    /// Create a source for the given endpoint URL
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint URL with the sheet selection appended
    pub fn request_url(&self, sheet: &SheetConfig) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("sheet", &sheet.sheet_name)
            .append_pair("range", &sheet.cell_range);
        url
    }

    /// Map request errors to user-facing messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_connect() {
            Error::fetch(format!("Unable to connect to {}", self.endpoint.host_str().unwrap_or("endpoint")))
        } else {
            Error::fetch(format!("Request failed: {}", error))
        }
    }
}

/// Reject non-success statuses
fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::fetch(format!("HTTP {}", status.as_u16())))
    }
}

/// Reject bodies that are an HTML page (login or error screens) rather than CSV
pub fn check_csv_body(body: &str) -> Result<()> {
    if body.trim_start().starts_with('<') {
        return Err(Error::fetch(
            "Received HTML instead of CSV; check that the endpoint is published and accessible",
        ));
    }
    Ok(())
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, sheet: &SheetConfig) -> Result<String> {
        let url = self.request_url(sheet);
        tracing::debug!(%url, "fetching sheet");

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        check_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response body: {}", e)))?;
        check_csv_body(&body)?;

        tracing::debug!(bytes = body.len(), "sheet fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_carries_sheet_and_range() {
        let source = HttpSheetSource::new("https://script.example.com/macros/s/abc/exec").unwrap();
        let url = source.request_url(&SheetConfig::default());

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("sheet".to_string(), "Página1".to_string()),
                ("range".to_string(), "A1:Z100000".to_string()),
            ]
        );
    }

    #[test]
    fn test_existing_query_is_kept() {
        let source = HttpSheetSource::new("https://example.com/exec?key=1").unwrap();
        let url = source.request_url(&SheetConfig::default());
        assert!(url.as_str().starts_with("https://example.com/exec?key=1&sheet="));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(HttpSheetSource::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(HttpSheetSource::new("ftp://example.com/x"), Err(Error::Config(_))));
    }

    #[test]
    fn test_status_check() {
        assert!(check_status(StatusCode::OK).is_ok());
        let err = check_status(StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert_eq!(err.to_string(), "Fetch error: HTTP 500");
    }

    #[test]
    fn test_html_body_is_rejected() {
        assert!(check_csv_body("a,b\n1,2").is_ok());
        assert!(check_csv_body("").is_ok());
        assert!(matches!(check_csv_body("  \n<!DOCTYPE html><html>"), Err(Error::Fetch(_))));
    }
}
