use crate::config::ShrinkConfig;
use crate::constants::{
    RESPONSE_ENVELOPE_FIELD, RESPONSE_ENVELOPE_URL_FIELD, RESPONSE_URL_FIELD,
};
use crate::credentials::TokenProvider;
use crate::error::{Result, ShrinkError};
use crate::probe::probe_content_length;
use crate::report::{render_compression_report, Preview, ReportSink};
use crate::utils::calculate_compression_ratio;
use crate::validation::{token_domain, validate_image_url};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionRequest {
    pub image_url: String,
}

impl CompressionRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
        }
    }
}

/// Output of [`CompressionOrchestrator::compress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedImage {
    pub compressed_image_url: String,
}

/// Output of [`CompressionOrchestrator::compress_with_stats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub compressed_image_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

#[derive(Serialize)]
struct CompressBody<'a> {
    #[serde(rename = "imageURL")]
    image_url: &'a str,
}

/// Drives one compression through the remote service.
///
/// Every call fetches a fresh token, posts the image URL to the compression
/// endpoint and, for [`compress_with_stats`](Self::compress_with_stats), probes
/// both images' sizes. Nothing is retried and nothing is cached between calls.
pub struct CompressionOrchestrator {
    client: Client,
    config: ShrinkConfig,
    tokens: Arc<dyn TokenProvider>,
    sink: Arc<dyn ReportSink>,
}

impl CompressionOrchestrator {
    pub fn new(
        config: ShrinkConfig,
        tokens: Arc<dyn TokenProvider>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config, tokens, sink))
    }

    pub fn with_client(
        client: Client,
        config: ShrinkConfig,
        tokens: Arc<dyn TokenProvider>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
            sink,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.tokens
    }

    /// Compress an image and return only the compressed URL.
    #[instrument(skip(self, request), fields(image_url = %request.image_url))]
    pub async fn compress(&self, request: &CompressionRequest) -> Result<CompressedImage> {
        let compressed_image_url = self.request_compression(request).await?;
        info!(compressed_image_url = %compressed_image_url, "compression complete");
        Ok(CompressedImage {
            compressed_image_url,
        })
    }

    /// Compress an image, probe both sizes and emit a markdown report.
    #[instrument(skip(self, request), fields(image_url = %request.image_url))]
    pub async fn compress_with_stats(
        &self,
        request: &CompressionRequest,
    ) -> Result<CompressionResult> {
        let compressed_image_url = self.request_compression(request).await?;

        let original_size =
            probe_content_length(&self.client, &request.image_url, self.config.probe_timeout)
                .await?;
        let compressed_size =
            probe_content_length(&self.client, &compressed_image_url, self.config.probe_timeout)
                .await?;

        let result = CompressionResult {
            compression_ratio: calculate_compression_ratio(original_size, compressed_size),
            compressed_image_url,
            original_size,
            compressed_size,
        };

        info!(
            original_size,
            compressed_size,
            compression_ratio = result.compression_ratio,
            "compression complete"
        );

        self.sink
            .preview(&Preview::Markdown(render_compression_report(&result)));

        Ok(result)
    }

    /// Validate, authenticate and call the compression endpoint.
    async fn request_compression(&self, request: &CompressionRequest) -> Result<String> {
        validate_image_url(&request.image_url)?;

        let domain = token_domain(&self.config.endpoint);
        let token = self.tokens.fetch_token(&domain).await?;
        debug!(domain = %domain, "token acquired");

        let body = CompressBody {
            image_url: &request.image_url,
        };
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header(AUTHORIZATION, token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.config.compress_timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "compression endpoint responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShrinkError::RemoteService {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        parse_compressed_url(&text)
    }
}

/// Extract the compressed image URL from a compression response body.
///
/// The body must be a JSON object. The URL is read from `compressedImageURL`,
/// then from `data.compressedImageUrl`; when neither holds a string the URL is
/// empty.
pub fn parse_compressed_url(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ShrinkError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        ShrinkError::MalformedResponse(format!("expected a JSON object, got: {}", value))
    })?;

    let url = object
        .get(RESPONSE_URL_FIELD)
        .and_then(Value::as_str)
        .or_else(|| {
            object
                .get(RESPONSE_ENVELOPE_FIELD)
                .and_then(|data| data.get(RESPONSE_ENVELOPE_URL_FIELD))
                .and_then(Value::as_str)
        });

    match url {
        Some(url) => Ok(url.to_string()),
        None => {
            warn!("response did not contain a compressed image URL");
            Ok(String::new())
        }
    }
}
