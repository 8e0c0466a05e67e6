//! Market Registry
//!
//! Maps the market identifiers printed in the listing to the exchange
//! suffix used by Yahoo-style tickers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in market table
const DEFAULT_MARKETS: &[(&str, Option<&str>)] = &[
    // (market identifier, ticker suffix)
    ("Xetra", Some(".DE")),
    ("LSE", Some(".L")),
    ("NSQ", None),
    ("NYSE", None),
    ("NYSE-MKT", None),
    ("TSX", Some(".TO")),
    ("AMS", Some(".AS")),
    ("PAR", Some(".PA")),
    ("BRU", Some(".BR")),
    ("SWX", Some(".SW")),
];

/// Suffix appended to a raw ticker; `None` keeps the ticker verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSuffix(Option<String>);

impl MarketSuffix {
    pub fn none() -> Self {
        Self(None)
    }

    /// An empty suffix is the same as no suffix
    pub fn new(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if suffix.is_empty() {
            Self(None)
        } else {
            Self(Some(suffix))
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Build the fully-qualified ticker
    pub fn apply(&self, raw_ticker: &str) -> String {
        match &self.0 {
            Some(suffix) => format!("{}{}", raw_ticker, suffix),
            None => raw_ticker.to_string(),
        }
    }
}

impl From<Option<String>> for MarketSuffix {
    fn from(suffix: Option<String>) -> Self {
        suffix.map(Self::new).unwrap_or_else(Self::none)
    }
}

/// Immutable market identifier -> suffix table.
///
/// Lookups are exact and case-sensitive. There is no way to add entries
/// once the registry is built.
#[derive(Debug, Clone)]
pub struct MarketRegistry {
    suffixes: HashMap<String, MarketSuffix>,
}

impl Default for MarketRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketRegistry {
    /// Registry with the built-in market table
    pub fn new() -> Self {
        Self::from_entries(
            DEFAULT_MARKETS
                .iter()
                .map(|(market, suffix)| (market.to_string(), suffix.map(str::to_string))),
        )
    }

    /// Registry from a configured table (later duplicates replace earlier ones)
    pub fn from_entries<I, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<MarketSuffix>,
    {
        let suffixes = entries
            .into_iter()
            .map(|(market, suffix)| (market.into(), suffix.into()))
            .collect();
        Self { suffixes }
    }

    /// Look up a market; `None` means the market is unknown
    pub fn lookup(&self, market: &str) -> Option<&MarketSuffix> {
        self.suffixes.get(market)
    }

    /// Fully-qualified ticker for a row, or `None` for an unknown market
    pub fn apply(&self, market: &str, raw_ticker: &str) -> Option<String> {
        self.lookup(market).map(|suffix| suffix.apply(raw_ticker))
    }

    pub fn contains(&self, market: &str) -> bool {
        self.suffixes.contains_key(market)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// Known market identifiers, sorted
    pub fn markets(&self) -> Vec<&str> {
        let mut markets: Vec<&str> = self.suffixes.keys().map(String::as_str).collect();
        markets.sort_unstable();
        markets
    }
}
