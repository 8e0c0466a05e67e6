//! ISIN -> ticker map built from extracted records

use super::{ListingError, SecurityRecord};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Sorted ISIN -> ticker map; a later record for the same ISIN wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsinTickerMap {
    entries: BTreeMap<String, String>,
    collisions: usize,
}

impl IsinTickerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold records in emission order (page order, then in-page order)
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SecurityRecord>,
    {
        let mut map = Self::new();
        map.extend(records);
        map
    }

    /// Insert a record, returning the ticker it replaced
    pub fn insert(&mut self, record: SecurityRecord) -> Option<String> {
        let previous = self.entries.insert(record.isin.clone(), record.ticker);
        if let Some(old) = &previous {
            self.collisions += 1;
            log::debug!(
                "Listing: ISIN {} seen again, replacing ticker {} with {}",
                record.isin,
                old,
                self.entries[&record.isin]
            );
        }
        previous
    }

    pub fn get(&self, isin: &str) -> Option<&str> {
        self.entries.get(isin).map(String::as_str)
    }

    /// Like `get`, but a missing ISIN is an error
    pub fn ticker_for(&self, isin: &str) -> Result<&str, ListingError> {
        self.get(isin).ok_or_else(|| ListingError::TickerNotFound {
            isin: isin.to_string(),
        })
    }

    /// Number of inserts that overwrote an existing ISIN
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by ISIN
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<SecurityRecord> for IsinTickerMap {
    fn extend<T: IntoIterator<Item = SecurityRecord>>(&mut self, records: T) {
        for record in records {
            self.insert(record);
        }
    }
}

impl FromIterator<SecurityRecord> for IsinTickerMap {
    fn from_iter<T: IntoIterator<Item = SecurityRecord>>(records: T) -> Self {
        Self::from_records(records)
    }
}

impl Serialize for IsinTickerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
