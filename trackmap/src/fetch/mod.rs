//! Tile download channel
//!
//! Defines the HTTP contract the download machinery depends on, behind a
//! trait so tests can substitute a mock transport.

mod http;

pub use http::{HttpFetcher, USER_AGENT};

#[cfg(test)]
pub use http::tests::{MockFetcher, MockResponse};

use std::future::Future;

use bytes::Bytes;
use thiserror::Error;

/// Errors from one tile transfer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP {code} from {uri}")]
    Status { code: u16, uri: String },
    /// The response body could not be read to the end.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// One-shot tile transfer.
///
/// A call performs a single GET of `uri` and resolves exactly once, with
/// the complete body or an error. The `progress` sink is invoked as body
/// bytes arrive with the running byte count and, when the server sent
/// one, the expected total.
pub trait TileFetcher: Send + Sync {
    fn fetch(
        &self,
        uri: &str,
        progress: &mut (dyn FnMut(u64, Option<u64>) + Send),
    ) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}
