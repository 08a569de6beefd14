use std::fmt;

/// Failure taxonomy for catalog loading and lookup.
///
/// `Clone` so a per-entry failure can live inside the catalog as a marker
/// and so every waiter joined on a single-flight load can receive the same
/// terminal error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Connection, timeout or non-429 HTTP failure.
    Network(String),
    /// HTTP 429 from the remote service.
    RateLimit,
    /// Unknown name: a 404 on a detail fetch, or a navigation lookup miss.
    NotFound(String),
    /// Response body did not match the expected shape.
    Parse(String),
    /// The load was torn down before it finished.
    Cancelled,
}

impl CatalogError {
    /// Whether a fresh attempt at the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Network(_) | CatalogError::RateLimit)
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Network(msg) => write!(f, "network error: {msg}"),
            CatalogError::RateLimit => write!(f, "rate limited by the remote service"),
            CatalogError::NotFound(name) => write!(f, "not found: {name}"),
            CatalogError::Parse(msg) => write!(f, "malformed response: {msg}"),
            CatalogError::Cancelled => write!(f, "catalog load cancelled"),
        }
    }
}

impl std::error::Error for CatalogError {}
