//! Error types for the lookup library.

/// Top-level error enum shared by the fetcher, reader, index builder and query service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection failure, timeout or non-success status.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Body grew past the download ceiling.
    #[error("download of {url} exceeded {limit} bytes")]
    SizeExceeded { url: String, limit: u64 },

    /// Listing page could not be parsed at all.
    #[error("parse error: {0}")]
    Parse(String),

    /// Bytes are not a recognized spreadsheet container.
    #[error("unsupported spreadsheet format")]
    UnsupportedFormat,

    /// Workbook container recognized but structurally unreadable.
    #[error("read error: {0}")]
    Read(String),

    #[error("index build failed: {0}")]
    Build(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A source file was resolved from the index but could not be fetched or read.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn network(url: &str, message: impl std::fmt::Display) -> Self {
        Error::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Wrap a per-file failure met while answering a query.
    pub(crate) fn unavailable(url: &str, err: Error) -> Self {
        Error::Unavailable(format!("{}: {}", url, err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
