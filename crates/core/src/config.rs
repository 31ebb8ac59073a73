//! Configuration management
//!
//! An upload run is described by a single immutable [`UploadConfig`]. It is
//! assembled by [`ConfigBuilder`] from up to three layers, lowest precedence
//! first: built-in defaults, an optional TOML config file, and command-line
//! values. The config file is `filemover/config.toml` under the platform
//! config directory unless a path is given explicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-west-2";

/// Static access credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Immutable settings for one upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    credentials: Credentials,
    region: String,
    bucket: String,
    root: PathBuf,
    key_prefix: Option<String>,
    rename_suffix: Option<String>,
    endpoint: Option<String>,
    overwrite: bool,
    dry_run: bool,
}

impl UploadConfig {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// File or directory the upload starts from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Suffix appended to a source file's path after it has been uploaded
    pub fn rename_suffix(&self) -> Option<&str> {
        self.rename_suffix.as_deref()
    }

    /// Custom S3-compatible endpoint URL
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// When set, the existence check is skipped and every file is written
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// When set, no write request is ever issued
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Contents of a TOML config file
///
/// Every key is optional. The source path is deliberately absent: it is
/// always given on the command line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub key_prefix: Option<String>,
    pub rename_suffix: Option<String>,
    pub endpoint: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// Loads the optional config file
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: PathBuf,
    required: bool,
}

impl ConfigLoader {
    /// Loader for the default config path; a missing file is not an error
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(Self {
            config_path: config_dir.join("filemover").join("config.toml"),
            required: false,
        })
    }

    /// Loader for an explicitly requested file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            required: true,
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Read and parse the config file
    pub fn load(&self) -> Result<ConfigFile> {
        if !self.required && !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file found");
            return Ok(ConfigFile::default());
        }

        let content = std::fs::read_to_string(&self.config_path).map_err(|e| {
            Error::Config(format!(
                "Cannot read config file {}: {e}",
                self.config_path.display()
            ))
        })?;
        let file: ConfigFile = toml::from_str(&content)?;
        tracing::debug!(path = %self.config_path.display(), "Loaded config file");
        Ok(file)
    }
}

/// Collects configuration layers and validates them into an [`UploadConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBuilder {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub root: Option<PathBuf>,
    pub key_prefix: Option<String>,
    pub rename_suffix: Option<String>,
    pub endpoint: Option<String>,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `other` on top of `self`
    ///
    /// Values present in `other` win; boolean flags are enabled if either
    /// layer enables them.
    pub fn overlay(self, other: ConfigBuilder) -> Self {
        Self {
            access_key: other.access_key.or(self.access_key),
            secret_key: other.secret_key.or(self.secret_key),
            region: other.region.or(self.region),
            bucket: other.bucket.or(self.bucket),
            root: other.root.or(self.root),
            key_prefix: other.key_prefix.or(self.key_prefix),
            rename_suffix: other.rename_suffix.or(self.rename_suffix),
            endpoint: other.endpoint.or(self.endpoint),
            overwrite: self.overwrite || other.overwrite,
            dry_run: self.dry_run || other.dry_run,
        }
    }

    /// Validate mandatory fields and produce the final configuration
    pub fn build(self) -> Result<UploadConfig> {
        let access_key = required(self.access_key, "accessKey")?;
        let secret_key = required(self.secret_key, "secretKey")?;
        let bucket = required(self.bucket, "bucket")?;
        let root = self
            .root
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::Config("missing required option -file".into()))?;

        let endpoint = non_empty(self.endpoint);
        if let Some(endpoint) = &endpoint {
            url::Url::parse(endpoint)?;
        }

        Ok(UploadConfig {
            credentials: Credentials {
                access_key,
                secret_key,
            },
            region: non_empty(self.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket,
            root,
            key_prefix: non_empty(self.key_prefix),
            rename_suffix: non_empty(self.rename_suffix),
            endpoint,
            overwrite: self.overwrite,
            dry_run: self.dry_run,
        })
    }
}

impl From<ConfigFile> for ConfigBuilder {
    fn from(file: ConfigFile) -> Self {
        Self {
            access_key: file.access_key,
            secret_key: file.secret_key,
            region: file.region,
            bucket: file.bucket,
            root: None,
            key_prefix: file.key_prefix,
            rename_suffix: file.rename_suffix,
            endpoint: file.endpoint,
            overwrite: file.overwrite,
            dry_run: file.dry_run,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::Config(format!("missing required option -{flag}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complete() -> ConfigBuilder {
        ConfigBuilder {
            access_key: Some("AKIDEXAMPLE".into()),
            secret_key: Some("secret".into()),
            bucket: Some("archive".into()),
            root: Some(PathBuf::from("/data")),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_applies_default_region() {
        let config = complete().build().unwrap();
        assert_eq!(config.region(), DEFAULT_REGION);
        assert_eq!(config.bucket(), "archive");
        assert_eq!(config.root(), Path::new("/data"));
        assert!(!config.overwrite());
        assert!(!config.dry_run());
        assert!(config.key_prefix().is_none());
    }

    #[test]
    fn test_build_missing_mandatory_fields() {
        for (builder, flag) in [
            (
                ConfigBuilder {
                    access_key: None,
                    ..complete()
                },
                "-accessKey",
            ),
            (
                ConfigBuilder {
                    secret_key: None,
                    ..complete()
                },
                "-secretKey",
            ),
            (
                ConfigBuilder {
                    bucket: Some(String::new()),
                    ..complete()
                },
                "-bucket",
            ),
            (
                ConfigBuilder {
                    root: None,
                    ..complete()
                },
                "-file",
            ),
        ] {
            let err = builder.build().unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert!(err.to_string().contains(flag), "{err} should name {flag}");
        }
    }

    #[test]
    fn test_empty_optional_values_are_unset() {
        let config = ConfigBuilder {
            key_prefix: Some(String::new()),
            rename_suffix: Some(String::new()),
            region: Some(String::new()),
            ..complete()
        }
        .build()
        .unwrap();
        assert!(config.key_prefix().is_none());
        assert!(config.rename_suffix().is_none());
        assert_eq!(config.region(), DEFAULT_REGION);
    }

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let file = ConfigBuilder {
            region: Some("eu-west-1".into()),
            bucket: Some("from-file".into()),
            key_prefix: Some("nightly".into()),
            overwrite: true,
            ..Default::default()
        };
        let cli = ConfigBuilder {
            bucket: Some("from-cli".into()),
            ..complete()
        };

        let config = file.overlay(cli).build().unwrap();
        assert_eq!(config.bucket(), "from-cli");
        assert_eq!(config.region(), "eu-west-1");
        assert_eq!(config.key_prefix(), Some("nightly"));
        assert!(config.overwrite());
    }

    #[test]
    fn test_build_rejects_malformed_endpoint() {
        let result = ConfigBuilder {
            endpoint: Some("not a url".into()),
            ..complete()
        }
        .build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));

        let config = ConfigBuilder {
            endpoint: Some("http://localhost:9000".into()),
            ..complete()
        }
        .build()
        .unwrap();
        assert_eq!(config.endpoint(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = complete().build().unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("\"secret\""));
    }

    #[test]
    fn test_load_missing_default_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader {
            config_path: temp_dir.path().join("config.toml"),
            required: false,
        };
        assert_eq!(loader.load().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_path(temp_dir.path().join("nope.toml"));
        assert!(matches!(loader.load(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("filemover.toml");
        std::fs::write(
            &path,
            r#"
            access_key = "AKIDEXAMPLE"
            secret_key = "secret"
            bucket = "archive"
            key_prefix = "backup"
            dry_run = true
            "#,
        )
        .unwrap();

        let file = ConfigLoader::with_path(&path).load().unwrap();
        assert_eq!(file.bucket.as_deref(), Some("archive"));
        assert!(file.dry_run);
        assert!(!file.overwrite);

        let config = ConfigBuilder::from(file)
            .overlay(ConfigBuilder {
                root: Some(PathBuf::from("/data")),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.key_prefix(), Some("backup"));
        assert!(config.dry_run());
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("filemover.toml");
        std::fs::write(&path, "buckett = \"typo\"\n").unwrap();

        let result = ConfigLoader::with_path(&path).load();
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
