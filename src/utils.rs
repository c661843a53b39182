/// Utility functions for common operations
///
/// Size formatting and ratio arithmetic shared by the orchestrator, the batch
/// runner and the report renderer.
use crate::constants::{
    BATCH_NAME_MAX_LEN, BYTES_PER_KB, IMAGE_EXTENSIONS, PROGRESS_SPINNER_TEMPLATE,
};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

/// Create a progress spinner with consistent styling
///
/// # Arguments
/// * `message` - Initial message to display
///
/// # Returns
/// * Configured `ProgressBar` instance
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(PROGRESS_SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Convert a byte count to kilobytes
pub fn bytes_to_kb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_KB
}

/// Convert a signed byte difference to kilobytes
pub fn signed_bytes_to_kb(bytes: i128) -> f64 {
    bytes as f64 / BYTES_PER_KB
}

/// Format a (possibly negative) byte count in human-readable form
///
/// # Arguments
/// * `bytes` - Size in bytes; negative values describe growth
///
/// # Returns
/// * `"512 B"`, `"1.50 KB"` or `"2.00 MB"`
pub fn format_file_size(bytes: i128) -> String {
    let magnitude = bytes.unsigned_abs() as f64;

    if magnitude < BYTES_PER_KB {
        format!("{} B", bytes)
    } else if magnitude < BYTES_PER_KB * BYTES_PER_KB {
        format!("{:.2} KB", bytes as f64 / BYTES_PER_KB)
    } else {
        format!("{:.2} MB", bytes as f64 / (BYTES_PER_KB * BYTES_PER_KB))
    }
}

/// Calculate compression ratio as a percentage
///
/// # Arguments
/// * `original_size` - Original size in bytes
/// * `compressed_size` - Compressed size in bytes
///
/// # Returns
/// * Compression ratio as percentage (positive means reduction, negative means increase).
///   Zero when the original size is unknown.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Signed difference between two sizes
///
/// Widened to `i128` so that any pair of `u64` sizes, and sums of them, fit.
pub fn bytes_saved(original_size: u128, compressed_size: u128) -> i128 {
    original_size as i128 - compressed_size as i128
}

/// Shorten a display name, appending `...` when it was cut
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > BATCH_NAME_MAX_LEN {
        let head: String = name.chars().take(BATCH_NAME_MAX_LEN).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Last non-empty path segment of a URL, or the whole URL when it has none
pub fn url_file_name(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(String::from))
        })
        .unwrap_or_else(|| raw.to_string())
}

/// Whether the URL's last path segment carries a known image extension
pub fn is_image_url(raw: &str) -> bool {
    let name = url_file_name(raw.trim());
    name.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
