pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod download;
pub mod error;
pub mod logger;
pub mod probe;
pub mod report;
pub mod shrink;
pub mod upload;
pub mod utils;
pub mod validation;

pub use batch::{compress_batch, parse_url_list, read_url_list, BatchEntry, BatchSummary};
pub use config::ShrinkConfig;
pub use credentials::{EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use download::download_compressed;
pub use error::{Result, ShrinkError};
pub use probe::probe_content_length;
pub use report::{
    render_batch_table, render_compression_report, render_file_report, MemorySink, NullSink,
    Preview, ReportSink, StdoutSink,
};
pub use shrink::{
    parse_compressed_url, CompressedImage, CompressionOrchestrator, CompressionRequest,
    CompressionResult,
};
pub use upload::{FileCompressionRequest, FileCompressionResult, FileCompressor};
pub use utils::{calculate_compression_ratio, is_image_url};
pub use validation::validate_image_url;
