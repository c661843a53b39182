use crate::error::{Result, ShrinkError};
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Read a resource's size with a HEAD request.
///
/// Only the `Content-Length` header is consulted; a missing or malformed value
/// counts as zero. A transport failure or timeout is a [`ShrinkError::Probe`].
pub async fn probe_content_length(client: &Client, url: &str, timeout: Duration) -> Result<u64> {
    debug!(url, "probing content length");

    let response = client
        .head(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| ShrinkError::Probe {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        warn!(url, status = %response.status(), "size probe returned non-success status");
    }

    let size = content_length_from_headers(response.headers());
    debug!(url, size, "probe complete");
    Ok(size)
}

/// `Content-Length` as an integer, or zero when absent or unparseable.
///
/// The header is read directly because the body-size hint of a HEAD response is
/// always empty.
pub fn content_length_from_headers(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}
