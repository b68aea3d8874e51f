//! Field extraction from product page markup
//!
//! This module turns raw HTML into a [`ProductInfo`] record using fixed
//! structural selectors. Missing fields are never errors: a page without the
//! expected node simply yields an empty string (or `false` for stock).

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured fields extracted from a product page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Product title, whitespace-trimmed
    pub title: String,

    /// Displayed price, verbatim including the currency symbol
    pub price: String,

    /// URL of the widest cover image, or empty if none could be selected
    pub image: String,

    /// Whether the availability text reads exactly "In stock."
    pub in_stock: bool,
}

/// Extraction-specific errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Parses a product page and extracts its structured fields
///
/// # Field Rules
///
/// - `title`: trimmed text of `#productTitle`
/// - `price`: trimmed text of `#buyNewSection .offer-price`
/// - `image`: widest entry of the `data-a-dynamic-image` JSON attribute on
///   the first `#leftCol` image carrying it (see [`largest_image`])
/// - `in_stock`: trimmed text of `#availability` equals exactly `"In stock."`
///
/// # Example
///
/// ```
/// use shelf_scout::scrape::parse_product_page;
///
/// let html = r#"<span id="productTitle"> Widget </span>"#;
/// let info = parse_product_page(html).unwrap();
/// assert_eq!(info.title, "Widget");
/// assert!(!info.in_stock);
/// ```
pub fn parse_product_page(html: &str) -> Result<ProductInfo, ExtractError> {
    let document = Html::parse_document(html);

    Ok(ProductInfo {
        title: element_text(&document, "#productTitle")?,
        price: element_text(&document, "#buyNewSection .offer-price")?,
        image: extract_cover_image(&document)?,
        in_stock: element_text(&document, "#availability")? == "In stock.",
    })
}

/// Trimmed text content of the first element matching `selector`
///
/// Returns an empty string if no element matches.
fn element_text(document: &Html, selector: &str) -> Result<String, ExtractError> {
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default())
}

/// Selects the cover image URL from the dynamic-image attribute
fn extract_cover_image(document: &Html) -> Result<String, ExtractError> {
    let selector = parse_selector("#leftCol img[data-a-dynamic-image]")?;

    let Some(attr) = document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("data-a-dynamic-image"))
    else {
        return Ok(String::new());
    };

    Ok(largest_image(attr))
}

/// Picks the URL with the maximum width from a dynamic-image attribute
///
/// The attribute value is a JSON object of the form
/// `{"url": [width, height], ...}`. An unparseable or empty mapping yields an
/// empty string. Entries are scanned in sorted key order with a
/// strict-greater-than comparison, so equal-maximum-width ties resolve to the
/// lexicographically smallest URL.
fn largest_image(attr: &str) -> String {
    let images: BTreeMap<String, [i64; 2]> = match serde_json::from_str(attr) {
        Ok(images) => images,
        Err(_) => return String::new(),
    };

    let mut best: Option<(&str, i64)> = None;

    for (src, [width, _height]) in &images {
        if best.map_or(true, |(_, max_width)| *width > max_width) {
            best = Some((src.as_str(), *width));
        }
    }

    best.map(|(src, _)| src.to_string()).unwrap_or_default()
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector(e.to_string()))
}
