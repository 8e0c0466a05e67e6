pub mod config;
pub mod export;
pub mod fetch;
pub mod listing;

pub use config::{CliOverrides, Config, ConfigError, LogLevel};
pub use export::{ExportError, OutputFormat};
pub use fetch::{FetchError, Source, DEFAULT_LISTING_URL};
pub use listing::{
    extract_document, extract_pdf, is_structural_isin, DocumentExtraction, IsinTickerMap,
    ListingError, MarketRegistry, MarketSuffix, RowExtractor, SecurityRecord,
    UnknownMarketPolicy,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
