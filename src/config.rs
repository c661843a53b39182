//! Runtime configuration for the compression orchestrator.
//!
//! Defaults come from [`crate::constants`]; the binary overrides them from
//! command-line arguments and their environment fallbacks.

use crate::constants::{
    COMPRESS_TIMEOUT_SECS, DEFAULT_ENDPOINT, DOWNLOAD_TIMEOUT_SECS, PROBE_TIMEOUT_SECS,
};
use crate::error::Result;
use crate::validation::validate_endpoint;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct ShrinkConfig {
    pub endpoint: Url,
    pub compress_timeout: Duration,
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            compress_timeout: Duration::from_secs(COMPRESS_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
        }
    }
}

impl ShrinkConfig {
    /// Build a configuration, replacing the default endpoint when one is given.
    pub fn new(endpoint: Option<&str>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = endpoint {
            config.endpoint = validate_endpoint(raw)?;
        }
        Ok(config)
    }

    pub fn with_compress_timeout(mut self, timeout: Duration) -> Self {
        self.compress_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }
}
