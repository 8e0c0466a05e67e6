//! Instrument Listing Import Module
//!
//! Turns the linearized page text of a broker's instrument listing into
//! `SecurityRecord`s (ISIN + fully-qualified ticker).

pub mod aggregate;
pub mod markets;
pub mod pdf;
pub mod rows;

pub use aggregate::IsinTickerMap;
pub use markets::{MarketRegistry, MarketSuffix};
pub use rows::{PageExtraction, RawRow, RowExtractor, SkippedRow};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static ISIN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").expect("valid ISIN regex"));

/// One resolved row of the listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub isin: String,
    pub ticker: String,
}

impl SecurityRecord {
    pub fn new(isin: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            isin: isin.into(),
            ticker: ticker.into(),
        }
    }
}

/// Errors raised while extracting a listing
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Unknown market identifier found in listing: {market}")]
    UnknownMarket { market: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Page {page}: {source}")]
    Page {
        page: usize,
        #[source]
        source: Box<ListingError>,
    },

    #[error("Ticker not found for ISIN: [{isin}]")]
    TickerNotFound { isin: String },
}

impl ListingError {
    /// Market identifier carried by this error, looking through page wrappers
    pub fn unknown_market(&self) -> Option<&str> {
        match self {
            Self::UnknownMarket { market } => Some(market),
            Self::Page { source, .. } => source.unknown_market(),
            _ => None,
        }
    }

    /// 1-based page number, if the error is tied to a page
    pub fn page(&self) -> Option<usize> {
        match self {
            Self::Page { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// What to do with a row whose market identifier is not in the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownMarketPolicy {
    /// Abandon the document at the first unknown market
    #[default]
    Fail,
    /// Skip the row and report it as a warning
    Skip,
}

/// A skipped row together with the page it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSkip {
    pub page: usize,
    pub row: SkippedRow,
}

/// Result of extracting a whole document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub pages: usize,
    pub records: Vec<SecurityRecord>,
    pub skipped: Vec<PageSkip>,
    pub warnings: Vec<String>,
}

impl DocumentExtraction {
    /// Fold the records into the final map (last write wins)
    pub fn into_map(self) -> IsinTickerMap {
        IsinTickerMap::from_records(self.records)
    }
}

/// Check the structural shape of an ISIN (no checksum validation)
pub fn is_structural_isin(s: &str) -> bool {
    ISIN_SHAPE.is_match(s)
}

/// Extract records from every page in document order.
///
/// Pages are numbered from 1 in errors and warnings. With
/// `UnknownMarketPolicy::Fail` the first page containing an unknown market
/// aborts the whole document.
pub fn extract_document<I, S>(
    pages: I,
    registry: &MarketRegistry,
    policy: UnknownMarketPolicy,
) -> Result<DocumentExtraction, ListingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extractor = RowExtractor::new(registry);
    let mut result = DocumentExtraction::default();

    for (index, page_text) in pages.into_iter().enumerate() {
        let page = index + 1;
        result.pages = page;

        match policy {
            UnknownMarketPolicy::Fail => {
                let records = extractor
                    .extract_page(page_text.as_ref())
                    .map_err(|e| ListingError::Page {
                        page,
                        source: Box::new(e),
                    })?;
                log::debug!("Listing: page {} yielded {} records", page, records.len());
                result.records.extend(records);
            }
            UnknownMarketPolicy::Skip => {
                let extraction = extractor.extract_page_lenient(page_text.as_ref());
                log::debug!(
                    "Listing: page {} yielded {} records, {} skipped",
                    page,
                    extraction.records.len(),
                    extraction.skipped.len()
                );
                for row in extraction.skipped {
                    let warning = format!(
                        "page {}: unknown market '{}' ({}, {})",
                        page, row.market, row.isin, row.raw_ticker
                    );
                    log::warn!("Listing: {}", warning);
                    result.warnings.push(warning);
                    result.skipped.push(PageSkip { page, row });
                }
                result.records.extend(extraction.records);
            }
        }
    }

    Ok(result)
}

/// Extract a listing straight from PDF bytes
pub fn extract_pdf(
    bytes: &[u8],
    registry: &MarketRegistry,
    policy: UnknownMarketPolicy,
) -> Result<DocumentExtraction, ListingError> {
    let pages = pdf::extract_pages(bytes)?;
    extract_document(&pages, registry, policy)
}
