//! Typed errors for the fetch pipeline.
//!
//! Application-level paths (file output, CLI) use `anyhow`; the pipeline keeps
//! these small enums so callers can tell a failed page from an empty one.

use thiserror::Error;

/// Failure of the underlying transport, before any page context is attached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),
    /// Connection, TLS, or timeout failure.
    #[error("network error: {0}")]
    Network(String),
    /// The body was not valid JSON.
    #[error("decode json: {0}")]
    Decode(String),
}

/// A single page request failed. Carries enough context to name the page in logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{indicator} page {page}: request failed with HTTP {status}")]
    Status {
        indicator: String,
        page: u32,
        status: u16,
    },
    #[error("{indicator} page {page}: {message}")]
    Transport {
        indicator: String,
        page: u32,
        message: String,
    },
    #[error("{indicator} page {page}: {message}")]
    Decode {
        indicator: String,
        page: u32,
        message: String,
    },
}

impl FetchError {
    /// Attach page context to a transport failure.
    pub fn from_transport(err: TransportError, indicator: &str, page: u32) -> Self {
        let indicator = indicator.to_string();
        match err {
            TransportError::Status(status) => FetchError::Status {
                indicator,
                page,
                status,
            },
            TransportError::Network(message) => FetchError::Transport {
                indicator,
                page,
                message,
            },
            TransportError::Decode(message) => FetchError::Decode {
                indicator,
                page,
                message,
            },
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            FetchError::Status { page, .. }
            | FetchError::Transport { page, .. }
            | FetchError::Decode { page, .. } => *page,
        }
    }
}

/// The response decoded but did not have the `[metadata, records]` layout.
///
/// Never fatal: the fetcher reports it as "no data for this request".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("response is not a top-level array")]
    NotAnArray,
    #[error("response has {0} element(s), expected [metadata, records]")]
    MissingRecords(usize),
    #[error("records element is empty")]
    EmptyRecords,
}

/// Invalid registry contents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate name in registry: {0}")]
    DuplicateName(String),
    #[error("duplicate code in registry: {0}")]
    DuplicateCode(String),
}
