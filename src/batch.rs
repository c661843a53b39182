use crate::error::{Result, ShrinkError};
use crate::report::{render_batch_table, Preview, ReportSink};
use crate::shrink::{CompressionOrchestrator, CompressionRequest, CompressionResult};
use crate::constants::IMAGE_EXTENSIONS;
use crate::utils::{bytes_saved, is_image_url, url_file_name};
use crate::validation::validate_image_url;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub name: String,
    pub result: CompressionResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
    /// `(image_url, error message)` for every URL that failed.
    pub failures: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn total_original(&self) -> u128 {
        self.entries
            .iter()
            .map(|e| u128::from(e.result.original_size))
            .sum()
    }

    pub fn total_compressed(&self) -> u128 {
        self.entries
            .iter()
            .map(|e| u128::from(e.result.compressed_size))
            .sum()
    }

    pub fn total_saved(&self) -> i128 {
        bytes_saved(self.total_original(), self.total_compressed())
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Compresses a list of image URLs one after another.
///
/// A failing URL is recorded and the batch moves on. Well-formed URLs whose
/// file name lacks an image extension are recorded as failures without
/// contacting the service. When at least one image succeeded, the comparison
/// table is sent to `sink`.
///
/// # Returns
/// * `Ok(summary)` - Per-image results and failures
/// * `Err(ShrinkError::Config)` - If `urls` is empty
pub async fn compress_batch(
    orchestrator: &CompressionOrchestrator,
    urls: &[String],
    sink: &dyn ReportSink,
) -> Result<BatchSummary> {
    if urls.is_empty() {
        return Err(ShrinkError::Config("No image URLs to compress".to_string()));
    }

    let mut summary = BatchSummary::default();

    for (index, url) in urls.iter().enumerate() {
        if validate_image_url(url).is_ok() && !is_image_url(url) {
            warn!(url = %url, "skipping URL without an image extension");
            summary.failures.push((url.clone(), not_an_image_reason()));
            continue;
        }

        info!(index = index + 1, total = urls.len(), url = %url, "compressing");

        match orchestrator
            .compress_with_stats(&CompressionRequest::new(url.clone()))
            .await
        {
            Ok(result) => summary.entries.push(BatchEntry {
                name: url_file_name(url),
                result,
            }),
            Err(e) => {
                warn!(url = %url, error = %e, "compression failed");
                summary.failures.push((url.clone(), e.to_string()));
            }
        }
    }

    if !summary.entries.is_empty() {
        sink.preview(&Preview::Markdown(render_batch_table(&summary)));
    }

    Ok(summary)
}

fn not_an_image_reason() -> String {
    format!(
        "not an image URL (expected .{})",
        IMAGE_EXTENSIONS.join(", .")
    )
}

/// Collects image URLs from a text file, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&contents))
}

pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
