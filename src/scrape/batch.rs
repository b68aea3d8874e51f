//! Batch execution over an ordered URL list

use crate::scrape::extractor::ProductInfo;
use crate::scrape::fetcher::fetch_product;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Outcome of one URL in a batch
///
/// Exactly one of `meta`/`error` is set once the batch returns; the unset
/// side is omitted from the JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProductInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the fetch-and-extract pipeline over each URL in order
///
/// Total function: the output has the same length and order as `urls`, and
/// one item's failure never aborts its siblings. Failures are folded into the
/// item's `error` field as the error's display text.
pub async fn run_batch(client: &Client, urls: &[String]) -> Vec<ItemResult> {
    let mut results = Vec::with_capacity(urls.len());

    for url in urls {
        let item = match fetch_product(client, url).await {
            Ok(meta) => ItemResult {
                url: url.clone(),
                meta: Some(meta),
                error: None,
            },
            Err(e) => {
                tracing::debug!("fetch failed for {}: {}", url, e);
                ItemResult {
                    url: url.clone(),
                    meta: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(item);
    }

    results
}
