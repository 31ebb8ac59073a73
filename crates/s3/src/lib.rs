//! filemover-s3: S3 SDK adapter for filemover
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;
pub mod region;

pub use client::S3Client;
pub use region::{resolve_region, static_credentials};
