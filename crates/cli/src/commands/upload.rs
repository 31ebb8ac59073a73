//! Upload run
//!
//! Builds the configuration, connects to S3 and walks the source path,
//! reporting each file as it is processed.

use filemover_core::{
    ConfigBuilder, ConfigFile, ConfigLoader, FileWalker, ObjectStore, Result, UploadConfig,
    UploadOutcome, UploadReport, UploadSummary, Uploader,
};
use filemover_s3::S3Client;
use serde::Serialize;

use super::Cli;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct UploadOutput<'a> {
    status: &'static str,
    source: String,
    bucket: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SummaryOutput {
    status: &'static str,
    uploaded: usize,
    skipped: usize,
    dry_run: usize,
    failed: usize,
}

/// Resolve configuration layers into the run configuration
pub fn load_config(cli: &Cli) -> Result<UploadConfig> {
    let file = match &cli.config {
        Some(path) => ConfigLoader::with_path(path).load()?,
        None => match ConfigLoader::new() {
            Ok(loader) => loader.load()?,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping default config file");
                ConfigFile::default()
            }
        },
    };

    ConfigBuilder::from(file).overlay(cli.config_layer()).build()
}

/// Run the upload described by `cli`
///
/// Returns an error only for conditions that stop the run before any file
/// is processed.
pub async fn execute(cli: &Cli, formatter: &Formatter) -> Result<UploadSummary> {
    let config = load_config(cli)?;
    tracing::debug!(?config, "Resolved configuration");

    let client = S3Client::new(&config).await?;
    let walker = FileWalker::new(config.root())?;

    Ok(run(&client, &config, walker, formatter).await)
}

/// Probe the bucket, then upload everything `walker` yields
///
/// A failed probe is logged and the uploads go ahead; each file reports its
/// own failure.
pub async fn run<S: ObjectStore + ?Sized>(
    store: &S,
    config: &UploadConfig,
    walker: FileWalker,
    formatter: &Formatter,
) -> UploadSummary {
    match store.probe_bucket(config.bucket()).await {
        Ok(location) => tracing::debug!(bucket = config.bucket(), %location, "Bucket reachable"),
        Err(e) => tracing::warn!(bucket = config.bucket(), error = %e, "Error getting bucket"),
    }

    let uploader = Uploader::new(store, config);
    let summary = uploader
        .upload_all(walker, |report| print_report(formatter, config, report))
        .await;

    print_summary(formatter, &summary);
    summary
}

/// Human-readable line for one report
fn report_line(bucket: &str, report: &UploadReport) -> String {
    let source = report.source.display();
    let key = report.key.as_ref().map(|k| k.as_str()).unwrap_or_default();

    match &report.outcome {
        UploadOutcome::SkippedExists => format!("Key exists for: {key}"),
        UploadOutcome::DryRun => format!("DRYRUN - Would upload file: {source} to key: {key}"),
        UploadOutcome::Uploaded => format!(
            "{source} -> {bucket}/{key} ({})",
            report
                .size_bytes
                .map(|size| humansize::format_size(size, humansize::BINARY))
                .unwrap_or_default()
        ),
        UploadOutcome::Failed(reason) => format!("Failed to upload {source}: {reason}"),
    }
}

fn print_report(formatter: &Formatter, config: &UploadConfig, report: &UploadReport) {
    if formatter.is_json() {
        let error = match &report.outcome {
            UploadOutcome::Failed(reason) => Some(reason.as_str()),
            _ => None,
        };
        let output = UploadOutput {
            status: report.outcome.label(),
            source: report.source.display().to_string(),
            bucket: config.bucket(),
            key: report.key.as_ref().map(|k| k.as_str()),
            size_bytes: report.size_bytes,
            size_human: report
                .size_bytes
                .map(|size| humansize::format_size(size, humansize::BINARY)),
            error,
        };
        if report.outcome.is_failure() {
            formatter.json_error(&output);
        } else {
            formatter.json(&output);
        }
        return;
    }

    let line = report_line(config.bucket(), report);
    if report.outcome.is_failure() {
        formatter.error(&line);
    } else {
        formatter.println(&line);
    }
}

fn print_summary(formatter: &Formatter, summary: &UploadSummary) {
    if formatter.is_json() {
        formatter.json(&SummaryOutput {
            status: if summary.failed > 0 {
                "completed_with_errors"
            } else {
                "success"
            },
            uploaded: summary.uploaded,
            skipped: summary.skipped,
            dry_run: summary.dry_run,
            failed: summary.failed,
        });
        return;
    }

    let message = format!(
        "Uploaded {}, skipped {}, dry-run {}, failed {}",
        summary.uploaded, summary.skipped, summary.dry_run, summary.failed
    );
    if summary.failed > 0 {
        formatter.warning(&format!("Completed with errors: {message}"));
    } else {
        formatter.success(&message);
    }
}
