//! Traits describing dataset sources and shared helper types.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::ParseError as ChronoParseError;
use reqwest::Error as ReqwestError;

use crate::model::{RawRow, SourceKind, SourceMeta};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading datasets or producing output.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The dataset is not a readable CSV document.
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
    /// Failed to parse a date entered by the user.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// Failed to encode output.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
    /// No source is registered for the location kind.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(SourceKind),
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Where a dataset is read from.
pub enum DatasetLocation {
    /// `http://` or `https://` URL.
    Url(String),
    /// Path on the local filesystem.
    Path(PathBuf),
}

impl DatasetLocation {
    /// Interpret a location string; URLs need an `http://` or `https://`
    /// scheme, everything else is a path with an optional `file://` prefix.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetLocation::Url(trimmed.to_owned())
        } else {
            let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
            DatasetLocation::Path(PathBuf::from(path))
        }
    }

    /// Kind of source able to read this location.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            DatasetLocation::Url(_) => SourceKind::Http,
            DatasetLocation::Path(_) => SourceKind::File,
        }
    }
}

impl FromStr for DatasetLocation {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetLocation::Url(url) => write!(formatter, "{url}"),
            DatasetLocation::Path(path) => write!(formatter, "{}", path.display()),
        }
    }
}

#[async_trait]
/// Trait for backends that fetch and tokenize a tabular dataset.
pub trait DatasetPort: Send + Sync {
    /// Metadata describing this source.
    fn source(&self) -> &SourceMeta;

    /// Load every row of the dataset at `location`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the dataset cannot be fetched or parsed,
    /// or when the location is not of this source's kind.
    async fn load(&self, location: &DatasetLocation) -> Result<Vec<RawRow>, PortError>;
}
