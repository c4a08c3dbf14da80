//! CLI application for nameplate barcode OCR and report submission.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{config, report, scan};

/// Nameplate OCR - Extract identification numbers from equipment photos
#[derive(Parser)]
#[command(name = "platescan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract identification numbers from photos
    Scan(scan::ScanArgs),

    /// Submit an acceptance test report
    Report(report::ReportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Scan(args) => scan::run(args, cli.config.as_deref()).await,
        Commands::Report(args) => report::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

/// Level directive for a `-v` count.
fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// A non-blank `RUST_LOG` replaces the `-v` level entirely.
fn log_filter(verbose: u8, rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directive = rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| verbosity_directive(verbose));
    Ok(EnvFilter::try_new(directive)?)
}

/// Logs go to stderr so JSON and CSV on stdout stay parseable.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref())?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_directive(0), "warn");
        assert_eq!(verbosity_directive(1), "info");
        assert_eq!(verbosity_directive(2), "debug");
        assert_eq!(verbosity_directive(7), "trace");
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let filter = log_filter(0, Some("platescan_core=trace")).unwrap();
        assert_eq!(filter.to_string(), "platescan_core=trace");

        let fallback = log_filter(2, Some("  ")).unwrap();
        assert_eq!(fallback.to_string(), "debug");
    }
}
