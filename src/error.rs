use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote compression service returned {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Malformed response from compression service: {0}")]
    MalformedResponse(String),

    #[error("Size probe failed for {url}: {source}")]
    Probe {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to download {url}: HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShrinkError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ShrinkError::RemoteService { status, .. } | ShrinkError::Download { status, .. } => {
                Some(*status)
            }
            ShrinkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_service_display() {
        let err = ShrinkError::RemoteService {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote compression service returned 401: unauthorized"
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_file_errors_display() {
        let err = ShrinkError::FileNotFound(PathBuf::from("missing.png"));
        assert_eq!(err.to_string(), "File not found: missing.png");
        assert_eq!(err.status(), None);

        let err = ShrinkError::FileTooLarge(10, 5);
        assert_eq!(
            err.to_string(),
            "File too large: 10 bytes. Maximum allowed: 5 bytes"
        );
    }

    #[test]
    fn test_status_absent_for_auth() {
        let err = ShrinkError::Auth("no token".to_string());
        assert_eq!(err.status(), None);
    }
}
