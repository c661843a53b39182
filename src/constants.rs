pub const DEFAULT_ENDPOINT: &str =
    "https://fusion-api.oomol.com/v1/tinify-png-shrink/action/compress";

pub const TOKEN_ENV_VAR: &str = "OOMOL_TOKEN";
pub const ENDPOINT_ENV_VAR: &str = "TINIFY_SHRINK_ENDPOINT";

// Local file compression service
pub const API_BASE_ENV_VAR: &str = "OOMOL_API_BASE";
pub const API_KEY_ENV_VAR: &str = "OOMOL_API_KEY";
pub const FILE_COMPRESSIONS_PATH: &str = "/api/tasks/images/compressions";
pub const UPLOAD_FIELD: &str = "file";
pub const COMPRESSED_FILE_SUFFIX: &str = "_compressed";
pub const MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

pub const COMPRESS_TIMEOUT_SECS: u64 = 30;
pub const PROBE_TIMEOUT_SECS: u64 = 10;
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;
pub const UPLOAD_TIMEOUT_SECS: u64 = 60;

// Remote field names
pub const RESPONSE_URL_FIELD: &str = "compressedImageURL";
pub const RESPONSE_ENVELOPE_FIELD: &str = "data";
pub const RESPONSE_ENVELOPE_URL_FIELD: &str = "compressedImageUrl";
pub const RESPONSE_OUTPUT_FIELD: &str = "output";
pub const RESPONSE_OUTPUT_URL_FIELD: &str = "url";

// Extensions accepted by batch mode
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

pub const BYTES_PER_KB: f64 = 1024.0;
pub const BATCH_NAME_MAX_LEN: usize = 20;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

/// Exit code when a remote service answered with an HTTP error status
pub const EXIT_REMOTE_STATUS: u8 = 3;

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const LINK_PREFIX: &str = "🔗";
pub const SAVE_PREFIX: &str = "💾";
