use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use release_check::{
    config::{Config, ConfigError, DEFAULT_LOCALE, DEFAULT_STATUS_URL},
    runner::VersionChecker,
};
use reqwest::Url;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "release-check")]
#[command(about = "Check that service instances report the expected release version")]
struct Cli {
    /// Instance name(s), separated by commas
    #[arg(short, long, value_name = "LIST")]
    instance: Option<String>,

    /// Expected release version
    #[arg(long)]
    version: Option<String>,

    /// Base URL of the status API
    #[arg(long, value_name = "URL", default_value = DEFAULT_STATUS_URL)]
    status_url: Url,

    #[arg(long, default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Per-request timeout in seconds; requests wait indefinitely when unset
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Treat instances whose status could not be fetched as unhealthy
    #[arg(long)]
    fail_on_error: bool,

    /// Log every per-instance result
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("{:#}", e);
        if is_usage_error(e) {
            eprintln!("{}", Cli::command().render_usage());
        }
    }
    ExitCode::from(exit_status(&result))
}

/// 0 only for a healthy run; argument errors and unhealthy runs both exit 1.
fn exit_status(result: &Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

fn is_usage_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ConfigError>().is_some()
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<bool> {
    let config = Config::new(cli.instance.as_deref(), cli.version.as_deref(), cli.status_url)?
        .with_locale(cli.locale)
        .with_timeout(cli.timeout.map(Duration::from_secs))
        .fail_on_error(cli.fail_on_error);

    let checker = VersionChecker::new(config).context("Failed to create HTTP client")?;
    let summary = checker.check_all().await;

    info!(
        total = summary.total(),
        matched = summary.matched,
        mismatched = summary.mismatched,
        failed = summary.failed,
        "release check finished"
    );

    Ok(summary.is_healthy(checker.config().fail_on_error))
}
