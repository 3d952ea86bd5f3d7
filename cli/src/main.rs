//! Solar CLI: entry point for generating configs and running simulations.

mod report;
mod script;

use anyhow::Context;
use clap::Parser;
use solar_nullables::NullExchange;
use solar_token::{ReflectionToken, TokenConfig, TokenSnapshot};
use solar_utils::{init_logging, LogFormat};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::report::Report;
use crate::script::Script;

#[derive(Parser)]
#[command(name = "solar-cli", about = "Solar reflection token simulator")]
struct Cli {
    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "SOLAR_LOG_FORMAT")]
    log_format: LogFormat,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "SOLAR_LOG_LEVEL")]
    log_level: String,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the default token configuration as TOML.
    InitConfig,

    /// Replay a script of operations against a fresh token and print a JSON
    /// report.
    Simulate {
        /// Token configuration (TOML). Defaults are used when omitted.
        #[arg(long, env = "SOLAR_CONFIG")]
        config: Option<PathBuf>,

        /// Script of operations (TOML).
        #[arg(long)]
        script: PathBuf,

        /// Abort at the first rejected step.
        #[arg(long)]
        stop_on_error: bool,

        /// Write a binary snapshot of the final state to this path.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },

    /// Restore a snapshot and print its JSON report.
    Inspect {
        /// Token configuration (TOML) the snapshot was taken under.
        #[arg(long, env = "SOLAR_CONFIG")]
        config: Option<PathBuf>,

        /// Snapshot file written by `simulate --snapshot-out`.
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TokenConfig> {
    match path {
        Some(path) => {
            let config = TokenConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(TokenConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level);

    match cli.command {
        Command::InitConfig => {
            print!("{}", TokenConfig::default().to_toml_string()?);
        }
        Command::Simulate {
            config,
            script,
            stop_on_error,
            snapshot_out,
        } => {
            let config = load_config(config.as_ref())?;
            let script = Script::from_toml_file(&script)?;
            let mut token = ReflectionToken::new(&config, NullExchange::new())?;

            let signals = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&signals);
            token.subscribe(Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            }));

            let failures = script.run(&mut token, stop_on_error);
            tracing::info!(
                steps = script.steps.len(),
                rejected = failures.len(),
                "simulation finished"
            );

            if let Some(path) = snapshot_out {
                std::fs::write(&path, token.snapshot().to_bytes()?)
                    .with_context(|| format!("failed to write snapshot {}", path.display()))?;
            }

            let report = Report::build(
                &token,
                script.steps.len(),
                failures,
                signals.load(Ordering::Relaxed),
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Inspect { config, snapshot } => {
            let config = load_config(config.as_ref())?;
            let bytes = std::fs::read(&snapshot)
                .with_context(|| format!("failed to read snapshot {}", snapshot.display()))?;
            let token = ReflectionToken::restore(
                &config,
                TokenSnapshot::from_bytes(&bytes)?,
                NullExchange::new(),
            )?;
            let report = Report::build(&token, 0, Vec::new(), 0)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
