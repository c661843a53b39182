use crate::error::{Result, ShrinkError};
use url::Url;

/// Validate an image URL before any network call is made.
///
/// Rejects empty input, unparseable URLs, non-HTTP schemes and URLs without a host.
pub fn validate_image_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShrinkError::InvalidUrl("Image URL cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ShrinkError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ShrinkError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            trimmed,
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ShrinkError::InvalidUrl(format!("{}: missing host", trimmed)));
    }

    Ok(url)
}

/// Validate the compression endpoint supplied through configuration.
pub fn validate_endpoint(raw: &str) -> Result<Url> {
    validate_image_url(raw).map_err(|e| match e {
        ShrinkError::InvalidUrl(msg) => ShrinkError::Config(format!("Invalid endpoint {}", msg)),
        other => other,
    })
}

/// Domain a credential must be scoped to for the given endpoint.
///
/// Uses the registrable part of the host (`fusion-api.oomol.com` becomes `oomol.com`);
/// IP addresses and single-label hosts are returned unchanged.
pub fn token_domain(endpoint: &Url) -> String {
    match endpoint.host() {
        Some(url::Host::Domain(host)) => {
            let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
            if labels.len() > 2 {
                labels[labels.len() - 2..].join(".")
            } else {
                host.to_string()
            }
        }
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
