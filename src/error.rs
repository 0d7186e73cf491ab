use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AvrcError {
    #[error("unknown subset '{0}'")]
    #[diagnostic(help("run `avrc download --list` to see available subsets"))]
    UnknownSubset(String),

    #[error("error fetching file information from {url}")]
    RemoteMetadata {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("file information not found for {0}")]
    MissingFileInfo(String),

    #[error(
        "not enough disk space in {}: required {required} bytes, available {available} bytes",
        .path.display()
    )]
    InsufficientDiskSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },

    #[error("error downloading {filename}")]
    Transfer {
        filename: String,
        #[source]
        source: TransportError,
    },

    #[error("checksum verification failed for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("error extracting archive {}: {message}", .path.display())]
    ArchiveExtraction { path: PathBuf, message: String },

    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedChecksum(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("stream interrupted: {0}")]
    Io(#[from] std::io::Error),
}
