//! Error types for filemover-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for filemover-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for filemover-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Root path is neither a file nor a directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Region name could not be resolved
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Credentials could not be constructed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Bucket or object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request to the storage service failed
    #[error("Network error: {0}")]
    Network(String),

    /// Storage client could not be initialized
    #[error("Storage client not initialized: {0}")]
    Client(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::InvalidPath(_)
            | Error::InvalidRegion(_)
            | Error::Auth(_)
            | Error::TomlParse(_)
            | Error::InvalidUrl(_) => 2, // UsageError
            Error::Client(_) => 99,      // ClientNotInitialized
            _ => 1,                      // GeneralError
        }
    }

    /// Whether this error should be followed by the usage block
    pub const fn shows_usage(&self) -> bool {
        self.exit_code() == 2
    }
}
