//! Human-readable reports and the sinks that display them.
//!
//! Reports are a side channel: sinks cannot fail and nothing they do feeds back
//! into a compression result.

use crate::batch::BatchSummary;
use crate::shrink::CompressionResult;
use crate::upload::FileCompressionResult;
use crate::utils::{
    bytes_saved, bytes_to_kb, format_file_size, signed_bytes_to_kb, truncate_name,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Mutex;

/// Payload handed to a [`ReportSink`].
///
/// Serializes as `{"type": "markdown", "data": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Preview {
    Markdown(String),
}

impl Preview {
    pub fn text(&self) -> &str {
        match self {
            Preview::Markdown(text) => text,
        }
    }
}

pub trait ReportSink: Send + Sync {
    fn preview(&self, preview: &Preview);
}

/// Prints previews to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn preview(&self, preview: &Preview) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not fail the compression.
        let _ = writeln!(stdout, "{}", preview.text());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn preview(&self, _preview: &Preview) {}
}

/// Keeps every preview in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    previews: Mutex<Vec<Preview>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previews(&self) -> Vec<Preview> {
        self.previews
            .lock()
            .map(|previews| previews.clone())
            .unwrap_or_default()
    }
}

impl ReportSink for MemorySink {
    fn preview(&self, preview: &Preview) {
        if let Ok(mut previews) = self.previews.lock() {
            previews.push(preview.clone());
        }
    }
}

/// Render the single-image statistics report.
pub fn render_compression_report(result: &CompressionResult) -> String {
    format!(
        "{}**Compressed Image URL**: {}",
        size_summary(result.original_size, result.compressed_size, result.compression_ratio),
        result.compressed_image_url,
    )
}

/// Render the report for a compressed local file.
pub fn render_file_report(result: &FileCompressionResult) -> String {
    format!(
        "{}**File Location**: {}",
        size_summary(result.original_size, result.compressed_size, result.compression_ratio),
        result.compressed_image.display(),
    )
}

fn size_summary(original_size: u64, compressed_size: u64, compression_ratio: f64) -> String {
    let saved = bytes_saved(original_size.into(), compressed_size.into());

    format!(
        "## Image Compression Results\n\
         \n\
         - **Original Size**: {:.2} KB\n\
         - **Compressed Size**: {:.2} KB\n\
         - **Compression Ratio**: {:.2}%\n\
         - **Space Saved**: {:.2} KB\n\
         \n",
        bytes_to_kb(original_size),
        bytes_to_kb(compressed_size),
        compression_ratio,
        signed_bytes_to_kb(saved),
    )
}

/// Render the batch comparison table.
pub fn render_batch_table(summary: &BatchSummary) -> String {
    let mut table = String::from("| Name | Original Size | Compressed Size | Compression Rate |\n");
    table.push_str("|------|---------------|-----------------|------------------|\n");

    for entry in &summary.entries {
        let _ = writeln!(
            table,
            "| {} | {} | {} | {:.2}% |",
            truncate_name(&entry.name),
            format_file_size(entry.result.original_size.into()),
            format_file_size(entry.result.compressed_size.into()),
            entry.result.compression_ratio,
        );
    }

    let _ = writeln!(
        table,
        "| Total Save: **{}** |",
        format_file_size(summary.total_saved())
    );

    table
}
