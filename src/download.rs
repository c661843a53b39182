use crate::error::{Result, ShrinkError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Downloads a compressed image to local storage.
///
/// # Arguments
/// * `client` - Shared HTTP client
/// * `url` - Compressed image URL returned by the service
/// * `token` - Credential sent as the `Authorization` header
/// * `destination` - Target file, or an existing directory to place a generated file in
/// * `timeout` - Request timeout
///
/// # Returns
/// * `Ok(path)` - Where the image was written
/// * `Err(ShrinkError)` - If the URL is empty, the request fails or the file cannot be written
pub async fn download_compressed(
    client: &Client,
    url: &str,
    token: &str,
    destination: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    if url.is_empty() {
        return Err(ShrinkError::InvalidUrl(
            "Service returned no compressed image URL to download".to_string(),
        ));
    }

    let image = fetch_image(client, url, Some(token), timeout).await?;
    let output_path = resolve_output_path(destination, &image.content_type).await;
    write_image(&output_path, &image.bytes).await?;

    Ok(output_path)
}

/// Body and content type of a downloaded image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// GET an image, sending `token` as the `Authorization` header when given.
///
/// A missing content type is reported as `image/jpeg`.
pub async fn fetch_image(
    client: &Client,
    url: &str,
    token: Option<&str>,
    timeout: Duration,
) -> Result<FetchedImage> {
    debug!(url, "downloading compressed image");

    let mut request = client.get(url).timeout(timeout);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, token);
    }
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ShrinkError::Download {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let bytes = response.bytes().await?.to_vec();
    Ok(FetchedImage {
        bytes,
        content_type,
    })
}

/// Write image bytes, creating missing parent directories.
pub async fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;

    info!(path = %path.display(), bytes = bytes.len(), "compressed image saved");
    Ok(())
}

/// Choose the file a download lands in.
///
/// An existing directory gets a timestamped `compressed_<millis>` file whose
/// extension follows the content type; any other path is used as given.
pub async fn resolve_output_path(destination: &Path, content_type: &str) -> PathBuf {
    let is_dir = tokio::fs::metadata(destination)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    if !is_dir {
        return destination.to_path_buf();
    }

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    destination.join(format!(
        "compressed_{}{}",
        millis,
        extension_for_content_type(content_type)
    ))
}

pub fn extension_for_content_type(content_type: &str) -> &'static str {
    if content_type.to_ascii_lowercase().contains("png") {
        ".png"
    } else {
        ".jpg"
    }
}
