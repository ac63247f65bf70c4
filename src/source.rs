//! Audio resource locators and byte fetching.
//!
//! A locator is whatever the user passed on the command line or typed into
//! the open prompt: a path, a `file://` URL or an `http(s)://` URL.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Remote(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unsupported locator scheme: {0}")]
    UnsupportedScheme(String),
}

impl Source {
    /// Parse a locator. Empty input and unknown URL schemes are rejected.
    pub fn parse(locator: &str) -> Result<Self, FetchError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(FetchError::UnsupportedScheme(String::new()));
        }

        if let Some(path) = locator.strip_prefix("file://") {
            let path = Url::parse(locator)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .unwrap_or_else(|| PathBuf::from(path));
            return Ok(Self::File(path));
        }
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return Ok(Self::Remote(locator.to_string()));
        }
        // Anything else that looks like `scheme://` is not something we can fetch.
        if let Some((scheme, _)) = locator.split_once("://") {
            if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(FetchError::UnsupportedScheme(scheme.to_string()));
            }
        }

        Ok(Self::File(PathBuf::from(locator)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// The locator as a URL, for desktop integration. Local paths are made
    /// absolute and percent-encoded.
    pub fn url(&self) -> Option<String> {
        match self {
            Self::File(p) => {
                let abs = std::path::absolute(p).ok()?;
                Url::from_file_path(abs).ok().map(String::from)
            }
            Self::Remote(url) => Some(url.clone()),
        }
    }

    /// Lowercased file extension; shown as the format label.
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::File(p) => p
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase()),
            Self::Remote(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let last = path.rsplit('/').next()?;
                let (_, ext) = last.rsplit_once('.')?;
                (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
            }
        }
    }

    /// Read the whole resource into memory.
    pub fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        match self {
            Self::File(path) => std::fs::read(path).map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            }),
            Self::Remote(url) => fetch_remote(url),
        }
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, FetchError> {
    let http = |source| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(http)?;
    let resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(http)?;
    let bytes = resp.bytes().map_err(http)?;

    tracing::debug!(url, len = bytes.len(), "fetched remote source");
    Ok(bytes.to_vec())
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}
