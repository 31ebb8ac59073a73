//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from filemover-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::error::display::DisplayErrorContext;

use filemover_core::{Error, ObjectStore, PutOptions, Result, UploadConfig};

use crate::region::{resolve_region, static_credentials};

/// Location reported by S3 for buckets in us-east-1
const DEFAULT_BUCKET_LOCATION: &str = "us-east-1";

/// S3 client wrapper
#[derive(Debug)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client bound to the configured region
    ///
    /// Region and credential problems are reported as
    /// [`Error::InvalidRegion`] and [`Error::Auth`].
    pub async fn new(config: &UploadConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        let region = resolve_region(config.region(), endpoint.is_some())?;
        let credentials = static_credentials(config.credentials())?;

        // Build SDK config
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region);
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        if sdk_config.region().is_none() || sdk_config.credentials_provider().is_none() {
            return Err(Error::Client(
                "SDK configuration is missing region or credentials".into(),
            ));
        }

        // S3-compatible endpoints generally need path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(endpoint.is_some())
            .build();

        tracing::debug!(region = config.region(), endpoint = ?endpoint, "Created S3 client");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    DisplayErrorContext(err).to_string()
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn probe_bucket(&self, bucket: &str) -> Result<String> {
        let response = self
            .inner
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().and_then(|s| s.code()) == Some("NoSuchBucket") {
                    Error::NotFound(format!("Bucket not found: {bucket}"))
                } else {
                    Error::Network(describe(&e))
                }
            })?;

        let location = response
            .location_constraint()
            .map(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BUCKET_LOCATION);

        Ok(location.to_string())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.inner.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().is_some_and(HeadObjectError::is_not_found) {
                    Ok(false)
                } else {
                    Err(Error::Network(describe(&e)))
                }
            }
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &PutOptions,
    ) -> Result<()> {
        let sse =
            aws_sdk_s3::types::ServerSideEncryption::from(options.server_side_encryption.as_str());

        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .server_side_encryption(sse)
            .content_encoding(&options.content_encoding)
            .set_content_type(options.content_type.clone())
            .send()
            .await
            .map_err(|e| Error::Network(describe(&e)))?;

        Ok(())
    }
}
