//! Listing Download
//!
//! Gets the raw listing document either over HTTP or from a local file.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// bossa.pl "list of all foreign instruments" (26.08.2025 edition)
pub const DEFAULT_LISTING_URL: &str = "https://bossa.pl/sites/b30/files/2025-08/document/Lista%20wszystkich%20instrument%C3%B3w%20zagranicznych%2026082025.pdf";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error for {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read {location}: {reason}")]
    Body { location: String, reason: String },
}

/// Where the listing comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http://` and `https://` are URLs, everything else is a path
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    pub async fn load(&self) -> Result<Vec<u8>, FetchError> {
        match self {
            Self::Url(url) => fetch_document(url).await,
            Self::File(path) => read_document(path).await,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn create_client() -> Result<Client, FetchError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(FetchError::Client)
}

/// Download the listing document
pub async fn fetch_document(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = create_client()?;
    log::info!("Fetch: downloading listing from {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| FetchError::Body {
        location: url.to_string(),
        reason: e.to_string(),
    })?;

    log::debug!("Fetch: received {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Read a listing document from disk
pub async fn read_document(path: &Path) -> Result<Vec<u8>, FetchError> {
    log::info!("Fetch: reading listing from {}", path.display());
    tokio::fs::read(path).await.map_err(|e| FetchError::Body {
        location: path.display().to_string(),
        reason: e.to_string(),
    })
}
