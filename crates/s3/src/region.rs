//! Region and credential resolution
//!
//! Turns the configured region name and static keys into SDK values,
//! rejecting anything the service would not accept.

use aws_config::Region;
use filemover_core::{Credentials, Error, Result};

/// Region names accepted without a custom endpoint
pub const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-east-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-southeast-5",
    "ap-southeast-7",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "mx-central-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-west-1",
    "us-west-2",
];

/// Resolve a region name
///
/// S3-compatible services behind a custom endpoint use their own region
/// names, so any non-empty name is accepted when `custom_endpoint` is set.
pub fn resolve_region(name: &str, custom_endpoint: bool) -> Result<Region> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidRegion("region name is empty".into()));
    }
    if !custom_endpoint && !KNOWN_REGIONS.contains(&name) {
        return Err(Error::InvalidRegion(format!("cannot resolve region {name}")));
    }
    Ok(Region::new(name.to_string()))
}

/// Build static SDK credentials
pub fn static_credentials(credentials: &Credentials) -> Result<aws_credential_types::Credentials> {
    if credentials.access_key.trim().is_empty() || credentials.secret_key.trim().is_empty() {
        return Err(Error::Auth(
            "Both accessKey and secretKey are required".into(),
        ));
    }

    Ok(aws_credential_types::Credentials::new(
        credentials.access_key.clone(),
        credentials.secret_key.clone(),
        None, // session token
        None, // expiry
        "filemover-static-credentials",
    ))
}
