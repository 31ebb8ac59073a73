//! ObjectStore trait definition
//!
//! This trait is the only view the uploader has of the storage service.
//! It keeps the upload procedure decoupled from the S3 SDK.

use async_trait::async_trait;

use crate::error::Result;

/// Content encoding declared on every uploaded object
pub const CONTENT_ENCODING_BASE64: &str = "base64";

/// Server-side encryption requested for uploaded objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerSideEncryption {
    /// AES-256 with storage-managed keys
    #[default]
    Aes256,
}

impl ServerSideEncryption {
    /// Header value understood by S3
    pub const fn as_str(self) -> &'static str {
        match self {
            ServerSideEncryption::Aes256 => "AES256",
        }
    }
}

/// Metadata attached to a write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub server_side_encryption: ServerSideEncryption,
    pub content_encoding: String,
    pub content_type: Option<String>,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            server_side_encryption: ServerSideEncryption::Aes256,
            content_encoding: CONTENT_ENCODING_BASE64.to_string(),
            content_type: None,
        }
    }
}

/// Trait for the storage operations the uploader needs
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the bucket's location, as a reachability check
    async fn probe_bucket(&self, bucket: &str) -> Result<String>;

    /// Check whether an object exists
    ///
    /// A missing object is `Ok(false)`, not an error.
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Write an object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &PutOptions,
    ) -> Result<()>;
}
