//! filemover - upload a file or directory tree to S3
//!
//! Walks the source path and stores every regular file in the target
//! bucket, base64-encoded and encrypted at rest.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

#[tokio::main]
async fn main() {
    let cli = match commands::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => std::process::exit(commands::report_parse_error(e).as_i32()),
    };

    // Initialize tracing subscriber for logging; stdout is reserved for reports
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
