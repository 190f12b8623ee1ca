//! inferbench - command-line interface for the inference benchmark harness

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use bench_client::{ClientConfig, OllamaClient};
use bench_core::{BenchConfig, PromptSet};
use bench_harness::Orchestrator;
use bench_runtime::{DockerRuntime, RuntimeConfig};

/// Benchmark locally-hosted LLM inference servers
#[derive(Debug, Parser)]
#[command(name = "inferbench")]
#[command(about = "Benchmark locally-hosted LLM inference servers")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full benchmark matrix
    Run {
        /// Override the report directory
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,

        /// Override the prompt file
        #[arg(long, value_name = "FILE")]
        test_file: Option<PathBuf>,
    },

    /// Validate the configuration and check the container runtime
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "inferbench={},bench_harness={},bench_runtime={},bench_client={},bench_core={}",
            log_level, log_level, log_level, log_level, log_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    debug!("Starting inferbench with args: {:?}", cli);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            report_dir,
            test_file,
        } => run_benchmarks(config, report_dir, test_file).await,
        Commands::Check => check(config).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            BenchConfig::load_from_file(path)?
        }
        None => BenchConfig::load()?,
    };
    Ok(config)
}

async fn run_benchmarks(
    mut config: BenchConfig,
    report_dir: Option<PathBuf>,
    test_file: Option<PathBuf>,
) -> Result<()> {
    if let Some(dir) = report_dir {
        config.report_dir = dir;
    }
    if let Some(file) = test_file {
        config.test_file = file;
    }

    let prompts = PromptSet::load_from_file(&config.test_file)?;
    info!(
        "Loaded {} prompt(s) from {}",
        prompts.len(),
        config.test_file.display()
    );

    let runtime = DockerRuntime::new(RuntimeConfig::new(&config.server.image))?;
    let client_config = ClientConfig::new(config.server.endpoint()?)
        .with_request_timeout(config.server.request_timeout());
    let client = OllamaClient::new(client_config)?;

    let orchestrator = Orchestrator::new(Arc::new(runtime), Arc::new(client), config, prompts)?;
    let summary = orchestrator.run().await?;

    if summary.benchmarked == 0 {
        anyhow::bail!(
            "no model produced benchmark results ({} failed, {} exhausted, {} skipped)",
            summary.failed,
            summary.exhausted,
            summary.skipped
        );
    }
    Ok(())
}

async fn check(config: BenchConfig) -> Result<()> {
    info!(
        "Configuration valid: {} model(s) across {} accelerator group(s)",
        config.model_list.len(),
        config.gpu_id_lists.len()
    );

    let prompts = PromptSet::load_from_file(&config.test_file)?;
    info!(
        "Prompt file {} holds {} prompt(s)",
        config.test_file.display(),
        prompts.len()
    );

    let runtime = DockerRuntime::new(RuntimeConfig::new(&config.server.image))?;
    let version = runtime.probe().await?;
    info!("Container runtime reachable, server version {}", version);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["inferbench", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { .. }));

        let cli = Cli::try_parse_from(["inferbench", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "inferbench",
            "--config",
            "bench.yaml",
            "run",
            "--report-dir",
            "/tmp/out",
            "--test-file",
            "prompts.yaml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("bench.yaml")));
        match cli.command {
            Commands::Run {
                report_dir,
                test_file,
            } => {
                assert_eq!(report_dir, Some(PathBuf::from("/tmp/out")));
                assert_eq!(test_file, Some(PathBuf::from("prompts.yaml")));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["inferbench", "check"]).unwrap();
        assert_eq!(cli.verbose, 0);

        let cli = Cli::try_parse_from(["inferbench", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
