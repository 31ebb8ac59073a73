//! CLI argument definitions and execution
//!
//! filemover takes single-dash, case-insensitive flags such as `-accessKey`.
//! They are rewritten to clap long options before parsing, so `--accessKey`
//! works as well.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use filemover_core::ConfigBuilder;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod upload;

/// Legacy flags: canonical name and whether a value follows
const LEGACY_FLAGS: &[(&str, bool)] = &[
    ("region", true),
    ("accessKey", true),
    ("secretKey", true),
    ("bucket", true),
    ("file", true),
    ("keyPrefix", true),
    ("renameFile", true),
    ("endpoint", true),
    ("config", true),
    ("overwrite", false),
    ("dryRun", false),
];

/// Usage block printed on fatal errors
pub const USAGE: &str = "
Usage: filemover [options]

    where options are:

    -region <region name>       - AWS Region name, default is us-west-2
    -accessKey <AccessKeyID>    - AWS Access Key ID, mandatory
    -secretKey <SecretKey>      - AWS Secret Key, mandatory
    -bucket <bucketName>        - Bucket to use, mandatory
    -file <path>                - Path to file or directory to move, mandatory
    -keyPrefix <prefix>         - Optional prefix to keys/files uploaded
    -renameFile <suffix>        - Optional suffix appended to files once uploaded
    -overwrite                  - Optional flag to overwrite keys that already exist
    -dryRun                     - Log only, don't actually upload files
    -endpoint <url>             - Optional S3-compatible endpoint URL
    -config <path>              - Optional TOML config file
";

/// filemover - upload a file or directory tree to S3
///
/// Every regular file under the source path is stored under its path
/// relative to the source, base64-encoded and encrypted at rest (AES256).
#[derive(Parser, Debug)]
#[command(name = "filemover")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// AWS region name [default: us-west-2]
    #[arg(long = "region", env = "FILEMOVER_REGION")]
    pub region: Option<String>,

    /// AWS access key ID
    #[arg(long = "accessKey", env = "FILEMOVER_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long = "secretKey", env = "FILEMOVER_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Target bucket
    #[arg(long = "bucket", env = "FILEMOVER_BUCKET")]
    pub bucket: Option<String>,

    /// File or directory to upload
    #[arg(long = "file", value_name = "PATH", allow_hyphen_values = true)]
    pub file: Option<PathBuf>,

    /// Prefix prepended to every object key
    #[arg(long = "keyPrefix", value_name = "PREFIX", allow_hyphen_values = true)]
    pub key_prefix: Option<String>,

    /// Suffix appended to each source file after it is uploaded
    #[arg(long = "renameFile", value_name = "SUFFIX", allow_hyphen_values = true)]
    pub rename_file: Option<String>,

    /// Upload even if an object with the same key exists
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Only log what would be uploaded
    #[arg(long = "dryRun")]
    pub dry_run: bool,

    /// S3-compatible endpoint URL
    #[arg(long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// TOML config file [default: filemover/config.toml in the platform config directory]
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

impl Cli {
    /// The command-line configuration layer
    pub fn config_layer(&self) -> ConfigBuilder {
        ConfigBuilder {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            region: self.region.clone(),
            bucket: self.bucket.clone(),
            root: self.file.clone(),
            key_prefix: self.key_prefix.clone(),
            rename_suffix: self.rename_file.clone(),
            endpoint: self.endpoint.clone(),
            overwrite: self.overwrite,
            dry_run: self.dry_run,
        }
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

/// Rewrite legacy single-dash flags to their canonical long form
///
/// The first argument is the program name and is kept as is, as is every
/// argument in value position.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut expects_value = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || expects_value {
            expects_value = false;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        let name = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('-'))
            .filter(|n| !n.is_empty());
        let (name, inline_value) = match name {
            Some(name) => match name.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (name, None),
            },
            None => {
                normalized.push(arg);
                continue;
            }
        };

        match LEGACY_FLAGS
            .iter()
            .find(|(flag, _)| flag.eq_ignore_ascii_case(name))
        {
            Some((flag, takes_value)) => {
                match inline_value {
                    Some(value) => normalized.push(format!("--{flag}={value}").into()),
                    None => {
                        normalized.push(format!("--{flag}").into());
                        expects_value = *takes_value;
                    }
                }
            }
            None => normalized.push(arg),
        }
    }

    normalized
}

/// Parse command-line arguments, accepting the legacy flag style
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(normalize_args(args))
}

/// Print the usage block to stderr
pub fn print_usage() {
    eprintln!("{USAGE}");
}

/// Report an argument parsing failure and pick the exit code
pub fn report_parse_error(err: clap::Error) -> ExitCode {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::Success
        }
        _ => {
            let _ = err.print();
            print_usage();
            ExitCode::UsageError
        }
    }
}

/// Execute an upload run and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(cli.output_config());

    match upload::execute(&cli, &formatter).await {
        Ok(_) => ExitCode::Success,
        Err(e) => {
            formatter.error(&e.to_string());
            if e.shows_usage() {
                print_usage();
            }
            ExitCode::from_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().copied())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_normalize_legacy_flags() {
        assert_eq!(
            normalized(&["filemover", "-accessKey", "AK", "-dryRun", "-file", "/data"]),
            vec!["filemover", "--accessKey", "AK", "--dryRun", "--file", "/data"]
        );
    }

    #[test]
    fn test_normalize_is_case_insensitive() {
        assert_eq!(
            normalized(&["filemover", "-ACCESSKEY", "AK", "-keyprefix", "p", "-OverWrite"]),
            vec!["filemover", "--accessKey", "AK", "--keyPrefix", "p", "--overwrite"]
        );
    }

    #[test]
    fn test_values_are_never_rewritten() {
        assert_eq!(
            normalized(&["filemover", "-keyPrefix", "-bucket", "-bucket", "b"]),
            vec!["filemover", "--keyPrefix", "-bucket", "--bucket", "b"]
        );
    }

    #[test]
    fn test_unknown_and_modern_flags_pass_through() {
        assert_eq!(
            normalized(&["filemover", "--json", "-q", "-bogus", "--region=eu-west-1"]),
            vec!["filemover", "--json", "-q", "-bogus", "--region=eu-west-1"]
        );
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = parse_args([
            "filemover",
            "-region",
            "eu-west-1",
            "-accessKey",
            "AK",
            "-secretKey",
            "SK",
            "-bucket",
            "archive",
            "-file",
            "/data",
            "-keyPrefix",
            "backup",
            "-renameFile",
            ".done",
            "-overwrite",
            "-dryRun",
        ])
        .unwrap();

        let config = cli.config_layer().build().unwrap();
        assert_eq!(config.region(), "eu-west-1");
        assert_eq!(config.credentials().access_key, "AK");
        assert_eq!(config.credentials().secret_key, "SK");
        assert_eq!(config.bucket(), "archive");
        assert_eq!(config.root(), std::path::Path::new("/data"));
        assert_eq!(config.key_prefix(), Some("backup"));
        assert_eq!(config.rename_suffix(), Some(".done"));
        assert!(config.overwrite());
        assert!(config.dry_run());
    }

    #[test]
    fn test_boolean_flags_do_not_consume_next_argument() {
        let cli = parse_args(["filemover", "-overwrite", "-bucket", "archive"]).unwrap();
        assert!(cli.overwrite);
        assert_eq!(cli.bucket.as_deref(), Some("archive"));
    }

    #[test]
    fn test_hyphenated_values_are_accepted() {
        let cli = parse_args([
            "filemover",
            "-renameFile",
            "-uploaded",
            "-keyPrefix",
            "-x",
            "-file",
            "-incoming",
        ])
        .unwrap();
        assert_eq!(cli.rename_file.as_deref(), Some("-uploaded"));
        assert_eq!(cli.key_prefix.as_deref(), Some("-x"));
        assert_eq!(cli.file.as_deref(), Some(std::path::Path::new("-incoming")));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = parse_args(["filemover", "-bucket", "b", "-verbose"]).unwrap_err();
        assert_ne!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_missing_value_is_rejected() {
        assert!(parse_args(["filemover", "-file"]).is_err());
    }

    #[test]
    fn test_missing_file_fails_config_build() {
        let cli = parse_args([
            "filemover",
            "-accessKey",
            "AK",
            "-secretKey",
            "SK",
            "-bucket",
            "archive",
        ])
        .unwrap();
        let err = cli.config_layer().build().unwrap_err();
        assert!(err.to_string().contains("-file"));
        assert!(err.shows_usage());
    }

    #[test]
    fn test_usage_lists_every_flag() {
        for (flag, _) in LEGACY_FLAGS {
            assert!(USAGE.contains(&format!("-{flag} ")), "usage is missing -{flag}");
        }
    }
}
