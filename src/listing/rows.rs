//! Row Extractor
//!
//! Recovers `market ISIN ticker` rows from one page of linearized text.
//! The page text comes straight from the PDF backend, so a row may share a
//! physical line with unrelated content (names, currencies, page headers).

use super::{ListingError, MarketRegistry, SecurityRecord};
use once_cell::sync::Lazy;
use regex::{CaptureMatches, Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;

// market (non-space) -> space -> ISIN (strict shape) -> space -> ticker (non-space)
static ROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<market>\S+)\s+(?P<isin>[A-Z]{2}[A-Z0-9]{9}[0-9])\s+(?P<ticker>\S+)")
        .unwrap()
});

/// A structural match before the market is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow<'t> {
    pub market: &'t str,
    pub isin: &'t str,
    pub raw_ticker: &'t str,
    /// Byte range of the whole match within the page text
    pub span: Range<usize>,
}

impl<'t> RawRow<'t> {
    fn from_captures(caps: &Captures<'t>) -> Self {
        // Every group of ROW_PATTERN takes part in every match
        let group = |name: &str| {
            caps.name(name)
                .expect("row pattern group missing from match")
                .as_str()
        };

        Self {
            market: group("market"),
            isin: group("isin"),
            raw_ticker: group("ticker"),
            span: caps.get_match().range(),
        }
    }

    /// Resolve the market suffix and build the record
    pub fn resolve(&self, registry: &MarketRegistry) -> Result<SecurityRecord, ListingError> {
        let suffix = registry
            .lookup(self.market)
            .ok_or_else(|| ListingError::UnknownMarket {
                market: self.market.to_string(),
            })?;

        Ok(SecurityRecord {
            isin: self.isin.to_string(),
            ticker: suffix.apply(self.raw_ticker),
        })
    }
}

/// Row dropped because its market is not in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub market: String,
    pub isin: String,
    pub raw_ticker: String,
}

impl From<&RawRow<'_>> for SkippedRow {
    fn from(row: &RawRow<'_>) -> Self {
        Self {
            market: row.market.to_string(),
            isin: row.isin.to_string(),
            raw_ticker: row.raw_ticker.to_string(),
        }
    }
}

/// Outcome of a lenient page extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExtraction {
    pub records: Vec<SecurityRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Iterator over the raw structural matches of a page
pub struct RawRows<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl<'t> Iterator for RawRows<'t> {
    type Item = RawRow<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|caps| RawRow::from_captures(&caps))
    }
}

/// Lazy sequence of resolved records for one page
pub struct Rows<'r, 't> {
    registry: &'r MarketRegistry,
    raw: RawRows<'t>,
}

impl Iterator for Rows<'_, '_> {
    type Item = Result<SecurityRecord, ListingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next().map(|row| row.resolve(self.registry))
    }
}

/// Stateless extractor; holds nothing but a reference to the registry
#[derive(Debug, Clone, Copy)]
pub struct RowExtractor<'r> {
    registry: &'r MarketRegistry,
}

impl<'r> RowExtractor<'r> {
    pub fn new(registry: &'r MarketRegistry) -> Self {
        Self { registry }
    }

    /// Non-overlapping structural matches, left to right
    pub fn matches<'t>(&self, text: &'t str) -> RawRows<'t> {
        RawRows {
            inner: ROW_PATTERN.captures_iter(text),
        }
    }

    /// Records in text order; calling again restarts from the beginning
    pub fn rows<'t>(&self, text: &'t str) -> Rows<'r, 't> {
        Rows {
            registry: self.registry,
            raw: self.matches(text),
        }
    }

    /// All records of a page, stopping at the first unknown market
    pub fn extract_page(&self, text: &str) -> Result<Vec<SecurityRecord>, ListingError> {
        self.rows(text).collect()
    }

    /// All records of a page, skipping rows with an unknown market
    pub fn extract_page_lenient(&self, text: &str) -> PageExtraction {
        let mut extraction = PageExtraction::default();

        for row in self.matches(text) {
            match row.resolve(self.registry) {
                Ok(record) => extraction.records.push(record),
                Err(_) => extraction.skipped.push(SkippedRow::from(&row)),
            }
        }

        extraction
    }
}
