use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use ackscan::backend::DEFAULT_TIMEOUT_SECS;
use ackscan::cli::{Cli, Commands};
use ackscan::reporter::{load_artifact, render};
use ackscan::{
    BackendClient, ConfigError, ConsoleReporter, OpenApiParser, OutputFormat, Pipeline,
    ProbeEngine, S3Uploader, exit_codes,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logger already initialized");
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            exit_codes::INTERNAL_ERROR
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let reporter = ConsoleReporter::new();

    match cli.command {
        Commands::Scan(args) => {
            let pipeline = Pipeline::new(
                BackendClient::new(DEFAULT_TIMEOUT_SECS).context("Failed to create backend client")?,
                ProbeEngine::new(args.concurrency, args.timeout),
                S3Uploader::new(args.delivery.region.clone()),
                OpenApiParser::new(args.timeout).context("Failed to create spec loader")?,
            );

            let outcome = pipeline.scan(&args).await;
            reporter.print_outcome(&outcome);
            Ok(outcome.exit_code())
        }

        Commands::Upload(args) => {
            let pipeline = Pipeline::new(
                BackendClient::new(DEFAULT_TIMEOUT_SECS).context("Failed to create backend client")?,
                ProbeEngine::new(1, DEFAULT_TIMEOUT_SECS),
                S3Uploader::new(args.delivery.region.clone()),
                OpenApiParser::new(DEFAULT_TIMEOUT_SECS).context("Failed to create spec loader")?,
            );

            let outcome = pipeline.redeliver(&args).await;
            reporter.print_outcome(&outcome);
            Ok(outcome.exit_code())
        }

        Commands::Render {
            input,
            format,
            output,
        } => {
            let format: OutputFormat = match format.parse() {
                Ok(format) => format,
                Err(e) => {
                    error!(stage = "config", "{}", e);
                    return Ok(exit_codes::CONFIG_ERROR);
                }
            };

            let findings = match load_artifact(&input) {
                Ok(findings) => findings,
                Err(e) => {
                    let e = ConfigError::Artifact {
                        path: input.display().to_string(),
                        reason: format!("{:#}", e),
                    };
                    error!(stage = "config", "{}", e);
                    return Ok(exit_codes::CONFIG_ERROR);
                }
            };
            let content = render(format, &findings)?;

            match output {
                Some(path) => {
                    fs::write(&path, content)
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                    println!("{} {}", "Report written to".green(), path.display());
                }
                None => print!("{}", content),
            }

            Ok(exit_codes::SUCCESS)
        }

        Commands::Parse { spec } => {
            let parser = OpenApiParser::new(DEFAULT_TIMEOUT_SECS)?;
            let spec = parser.load(&spec).await?;
            reporter.print_spec(&spec);
            Ok(exit_codes::SUCCESS)
        }
    }
}
