//! HTTP fetching of individual product pages
//!
//! This module builds the shared HTTP client and performs one GET per item,
//! classifying failures into the per-item error taxonomy. Failures here never
//! escape a batch: the batch runner folds them into the item's result.

use crate::config::FetcherConfig;
use crate::scrape::extractor::{parse_product_page, ExtractError, ProductInfo};
use reqwest::{Client, StatusCode};
use url::Url;

/// Per-item fetch failure
///
/// The display text of each variant is what ends up in the item's `error`
/// field, so messages stay short and human-readable.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The string is not a well-formed absolute request URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request itself failed (DNS, connection, unsupported scheme, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but its status was not 200 OK
    #[error("{reason}")]
    HttpStatus { status: u16, reason: String },

    /// The response body could not be parsed as a document
    #[error("{0}")]
    Parse(#[from] ExtractError),
}

/// Builds the HTTP client shared by all fetches
///
/// No request timeout is configured; a hung upstream blocks its own batch
/// item.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single product page and extracts its fields
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The product page URL
///
/// # Returns
///
/// * `Ok(ProductInfo)` - The page was fetched with 200 OK and parsed
/// * `Err(FetchError)` - Which phase failed: URL validation, transport,
///   status check, or extraction
pub async fn fetch_product(client: &Client, url: &str) -> Result<ProductInfo, FetchError> {
    let request_url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    if request_url.host_str().is_none() {
        return Err(FetchError::InvalidUrl(format!("no host in {}", url)));
    }

    let response = client.get(request_url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
        });
    }

    let body = response.bytes().await?;
    let text = std::str::from_utf8(&body).map_err(ExtractError::from)?;

    Ok(parse_product_page(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        build_http_client(&FetcherConfig::default()).expect("build client")
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let err = fetch_product(&test_client(), "not-a-url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_hostless_url_rejected() {
        let err = fetch_product(&test_client(), "mailto:someone@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_transport_error() {
        // Well-formed (scheme + host), so it passes validation and fails at
        // the transport layer instead.
        let err = fetch_product(&test_client(), "ftp://example.com/file")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
