//! HTTP transport over reqwest.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use super::{FetchError, TileFetcher};

/// User agent sent with every tile request, as tile usage policies ask.
pub const USER_AGENT: &str = concat!("trackmap/", env!("CARGO_PKG_VERSION"));

/// Real tile transport over a shared reqwest client.
///
/// The client follows redirects (some providers bounce between mirror
/// hosts) and identifies itself with [`USER_AGENT`]. It imposes no
/// deadline of its own; callers bound each fetch with a timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates the transport.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

impl TileFetcher for HttpFetcher {
    async fn fetch(
        &self,
        uri: &str,
        progress: &mut (dyn FnMut(u64, Option<u64>) + Send),
    ) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                uri: uri.to_string(),
            });
        }

        let total = response.content_length();
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::Body)?;
            body.extend_from_slice(&chunk);
            progress(body.len() as u64, total);
        }

        Ok(body.freeze())
    }
}
