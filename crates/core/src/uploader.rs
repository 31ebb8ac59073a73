//! Upload decision procedure
//!
//! For every file produced by the walker the uploader derives the object
//! key, applies the overwrite policy, and either records a dry run or
//! writes the base64-encoded body. Per-file failures never stop the walk.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::UploadConfig;
use crate::encoding::encode_body;
use crate::error::Result;
use crate::key::ObjectKey;
use crate::traits::{ObjectStore, PutOptions};
use crate::walker::FileWalker;

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// An object already exists under the key; nothing was written
    SkippedExists,
    /// The object was written
    Uploaded,
    /// Dry run; the write was not issued
    DryRun,
    /// The file could not be uploaded
    Failed(String),
}

impl UploadOutcome {
    /// Short machine-readable label
    pub const fn label(&self) -> &'static str {
        match self {
            UploadOutcome::SkippedExists => "skipped",
            UploadOutcome::Uploaded => "uploaded",
            UploadOutcome::DryRun => "dry_run",
            UploadOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Local source path
    pub source: PathBuf,
    /// Destination key, absent when it could not be derived
    pub key: Option<ObjectKey>,
    pub outcome: UploadOutcome,
    /// Size of the source file in bytes, when it was read
    pub size_bytes: Option<u64>,
}

/// Outcome counts for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn record(&mut self, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::SkippedExists => self.skipped += 1,
            UploadOutcome::Uploaded => self.uploaded += 1,
            UploadOutcome::DryRun => self.dry_run += 1,
            UploadOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.uploaded + self.skipped + self.dry_run + self.failed
    }
}

/// Uploads files according to an [`UploadConfig`]
pub struct Uploader<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    config: &'a UploadConfig,
}

impl<'a, S: ObjectStore + ?Sized> Uploader<'a, S> {
    pub fn new(store: &'a S, config: &'a UploadConfig) -> Self {
        Self { store, config }
    }

    /// Walk the configured root and upload every file found
    ///
    /// Fails only if the root itself cannot be classified.
    pub async fn run<F>(&self, on_report: F) -> Result<UploadSummary>
    where
        F: FnMut(&UploadReport),
    {
        let walker = FileWalker::new(self.config.root())?;
        Ok(self.upload_all(walker, on_report).await)
    }

    /// Upload every file produced by `walker`, one at a time
    ///
    /// `on_report` is called once per file as soon as it is processed.
    pub async fn upload_all<F>(&self, walker: FileWalker, mut on_report: F) -> UploadSummary
    where
        F: FnMut(&UploadReport),
    {
        let mut summary = UploadSummary::default();

        for entry in walker {
            let report = match entry {
                Ok(path) => self.upload_file(&path).await,
                Err(e) => UploadReport {
                    source: e.path.clone(),
                    key: None,
                    outcome: UploadOutcome::Failed(e.to_string()),
                    size_bytes: None,
                },
            };
            summary.record(&report.outcome);
            on_report(&report);
        }

        summary
    }

    /// Process a single file
    pub async fn upload_file(&self, path: &Path) -> UploadReport {
        let key = match ObjectKey::derive(self.config.root(), path, self.config.key_prefix()) {
            Ok(key) => key,
            Err(e) => {
                return UploadReport {
                    source: path.to_path_buf(),
                    key: None,
                    outcome: UploadOutcome::Failed(e.to_string()),
                    size_bytes: None,
                };
            }
        };

        let (outcome, size_bytes) = self.upload_to_key(path, &key).await;
        UploadReport {
            source: path.to_path_buf(),
            key: Some(key),
            outcome,
            size_bytes,
        }
    }

    async fn upload_to_key(&self, path: &Path, key: &ObjectKey) -> (UploadOutcome, Option<u64>) {
        let bucket = self.config.bucket();

        if !self.config.overwrite() {
            match self.store.object_exists(bucket, key.as_str()).await {
                Ok(true) => {
                    tracing::debug!(%key, "Object exists, skipping");
                    return (UploadOutcome::SkippedExists, None);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Existence check failed, uploading anyway");
                }
            }
        }

        if self.config.dry_run() {
            tracing::debug!(%key, path = %path.display(), "Dry run, not uploading");
            return (UploadOutcome::DryRun, None);
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                return (
                    UploadOutcome::Failed(format!("Failed to read {}: {e}", path.display())),
                    None,
                );
            }
        };
        let size = data.len() as u64;
        let body = encode_body(&data);
        drop(data);

        let options = PutOptions {
            content_type: mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_string()),
            ..Default::default()
        };

        if let Err(e) = self
            .store
            .put_object(bucket, key.as_str(), body, &options)
            .await
        {
            return (UploadOutcome::Failed(e.to_string()), Some(size));
        }

        tracing::debug!(%key, size, "Uploaded");

        if let Some(suffix) = self.config.rename_suffix() {
            rename_source(path, suffix);
        }

        (UploadOutcome::Uploaded, Some(size))
    }
}

/// Append `suffix` to the file's path; failure is only logged
fn rename_source(path: &Path, suffix: &str) {
    let mut renamed = OsString::from(path.as_os_str());
    renamed.push(suffix);
    let renamed = PathBuf::from(renamed);

    if let Err(e) = fs::rename(path, &renamed) {
        tracing::warn!(
            path = %path.display(),
            target = %renamed.display(),
            error = %e,
            "Failed to rename uploaded file"
        );
    }
}
