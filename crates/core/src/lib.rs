//! filemover-core: Core library for the filemover upload tool
//!
//! This crate provides the core functionality for filemover, including:
//! - Configuration building and config file loading
//! - Object key derivation
//! - Filesystem walking
//! - The ObjectStore trait and the upload decision procedure
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing the upload logic to be tested without a storage service.

pub mod config;
pub mod encoding;
pub mod error;
pub mod key;
pub mod traits;
pub mod uploader;
pub mod walker;

pub use config::{ConfigBuilder, ConfigFile, ConfigLoader, Credentials, UploadConfig};
pub use error::{Error, Result};
pub use key::ObjectKey;
pub use traits::{ObjectStore, PutOptions, ServerSideEncryption};
pub use uploader::{UploadOutcome, UploadReport, UploadSummary, Uploader};
pub use walker::{FileWalker, RootKind, WalkError};
