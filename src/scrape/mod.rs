//! Product page scraping
//!
//! This module contains the fetch-and-extract pipeline:
//! - Building the shared HTTP client
//! - Fetching individual product pages
//! - Extracting structured fields from their markup
//! - Running ordered batches of URLs

mod batch;
mod extractor;
mod fetcher;

pub use batch::{run_batch, ItemResult};
pub use extractor::{parse_product_page, ExtractError, ProductInfo};
pub use fetcher::{build_http_client, fetch_product, FetchError};
