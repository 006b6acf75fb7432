use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// What a single reachability check observed.
///
/// Timeouts are not represented here: the validator owns the deadline and
/// drops the probe future when it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResponse {
    /// The server answered with this status code
    Status(u16),
    /// The host exists but no request was made (name resolution only)
    Resolved,
    /// DNS failure, refused connection, TLS error and the like
    TransportFailure(String),
}

/// An existence check against an external URL.
///
/// Implementations must be cancel-safe: dropping the returned future aborts
/// the check.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &Url) -> ProbeResponse;
}
