//! Compression of local image files.
//!
//! The file is uploaded as `multipart/form-data` to the task API, the
//! compressed image it points back to is downloaded next to the input (or to
//! an explicit output path) and both sizes are read from the file system.

use crate::constants::{
    COMPRESSED_FILE_SUFFIX, DOWNLOAD_TIMEOUT_SECS, FILE_COMPRESSIONS_PATH, MAX_UPLOAD_SIZE,
    RESPONSE_ENVELOPE_FIELD, RESPONSE_OUTPUT_FIELD, RESPONSE_OUTPUT_URL_FIELD, UPLOAD_FIELD,
    UPLOAD_TIMEOUT_SECS,
};
use crate::credentials::TokenProvider;
use crate::download::{fetch_image, write_image};
use crate::error::{Result, ShrinkError};
use crate::report::{render_file_report, Preview, ReportSink};
use crate::utils::calculate_compression_ratio;
use crate::validation::{token_domain, validate_endpoint};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCompressionRequest {
    pub input: PathBuf,
    /// Where to write the result; `<name>_compressed<ext>` next to the input when absent.
    pub output: Option<PathBuf>,
}

impl FileCompressionRequest {
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output,
        }
    }
}

/// Output of [`FileCompressor::compress_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCompressionResult {
    pub compressed_image: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

pub struct FileCompressor {
    client: Client,
    upload_url: Url,
    domain: String,
    tokens: Arc<dyn TokenProvider>,
    sink: Arc<dyn ReportSink>,
    upload_timeout: Duration,
    download_timeout: Duration,
}

impl FileCompressor {
    /// Build a compressor for the task API rooted at `api_base`.
    ///
    /// # Returns
    /// * `Err(ShrinkError::Config)` - If `api_base` is not an HTTP(S) URL
    pub fn new(
        api_base: &str,
        tokens: Arc<dyn TokenProvider>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, api_base, tokens, sink)
    }

    pub fn with_client(
        client: Client,
        api_base: &str,
        tokens: Arc<dyn TokenProvider>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        let upload_url = validate_endpoint(&build_upload_url(api_base))?;
        let domain = token_domain(&upload_url);

        Ok(Self {
            client,
            upload_url,
            domain,
            tokens,
            sink,
            upload_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
        })
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Upload a local image, save the compressed copy and report the savings.
    ///
    /// # Returns
    /// * `Ok(result)` - Output path, both sizes and the ratio
    /// * `Err(ShrinkError::FileNotFound)` - If the input does not exist
    /// * `Err(ShrinkError::FileTooLarge)` - If the input exceeds the upload limit
    /// * `Err(ShrinkError::RemoteService)` - If the upload is rejected
    /// * `Err(ShrinkError::MalformedResponse)` - If the response has no `data.output.url`
    #[instrument(skip(self, request), fields(input = %request.input.display()))]
    pub async fn compress_file(
        &self,
        request: &FileCompressionRequest,
    ) -> Result<FileCompressionResult> {
        let input = &request.input;
        if !input.is_file() {
            return Err(ShrinkError::FileNotFound(input.clone()));
        }

        let original_size = tokio::fs::metadata(input).await?.len();
        if original_size > MAX_UPLOAD_SIZE {
            return Err(ShrinkError::FileTooLarge(original_size, MAX_UPLOAD_SIZE));
        }

        let output_path = default_output_path(input, request.output.as_deref());

        let api_key = self.tokens.fetch_token(&self.domain).await?;
        debug!(domain = %self.domain, "api key acquired");

        let data = tokio::fs::read(input).await?;
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(data).file_name(file_name));

        let response = self
            .client
            .post(self.upload_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "compression task endpoint responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShrinkError::RemoteService {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let compressed_url = parse_output_url(&text)?;

        let image = fetch_image(&self.client, &compressed_url, None, self.download_timeout).await?;
        write_image(&output_path, &image.bytes).await?;

        let compressed_size = tokio::fs::metadata(&output_path).await?.len();
        let result = FileCompressionResult {
            compressed_image: output_path,
            original_size,
            compressed_size,
            compression_ratio: calculate_compression_ratio(original_size, compressed_size),
        };

        info!(
            original_size,
            compressed_size,
            compression_ratio = result.compression_ratio,
            "file compression complete"
        );

        self.sink.preview(&Preview::Markdown(render_file_report(&result)));

        Ok(result)
    }
}

fn build_upload_url(api_base: &str) -> String {
    format!(
        "{}{}",
        api_base.trim().trim_end_matches('/'),
        FILE_COMPRESSIONS_PATH
    )
}

/// Where a compressed file is written.
///
/// An explicit output is used as given, unless it is an existing directory, in
/// which case the `<name>_compressed<ext>` file goes inside it. Without an
/// output the file lands next to the input.
pub fn default_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, COMPRESSED_FILE_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, COMPRESSED_FILE_SUFFIX),
    };

    match output {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(file_name),
    }
}

/// Extract `data.output.url` from a compression task response.
pub fn parse_output_url(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ShrinkError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    value
        .get(RESPONSE_ENVELOPE_FIELD)
        .and_then(|data| data.get(RESPONSE_OUTPUT_FIELD))
        .and_then(|output| output.get(RESPONSE_OUTPUT_URL_FIELD))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            ShrinkError::MalformedResponse(format!("missing data.output.url in: {}", value))
        })
}
