//! Weekly podiums CLI
//!
//! Fetches the team results page, posts new podiums of the last week to
//! Discord and remembers what was posted. Meant to be run once a week by an
//! external scheduler.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use podiums::{
    error::Result,
    models::{Config, ENV_COOKIE},
    pipeline,
    services::{DiscordNotifier, LogNotifier, Notifier, RowExtractor, ZwiftPowerSource},
    storage::LocalSeenStore,
};

/// Weekly ZwiftPower podiums to Discord
#[derive(Parser, Debug)]
#[command(name = "podiums", version, about = "Weekly ZwiftPower podiums to Discord")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "podiums.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch results, post new podiums and remember them
    Run {
        /// Log the webhook payload instead of posting; never writes state
        #[arg(long)]
        dry_run: bool,

        /// Post a "no podiums" message when nothing new was found
        #[arg(long)]
        always_notify: bool,

        /// Reference time for the window (RFC 3339, default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Extract results from a saved page and print them as JSON
    Parse {
        /// HTML file of a team results page
        file: PathBuf,
    },

    /// Validate configuration and secrets
    Validate,

    /// Show the team URL and seen store status
    Info,
}

/// Initialize logging based on verbosity flag or `DEBUG=1`.
fn init_logging(verbose: bool) {
    let debug = verbose || std::env::var("DEBUG").is_ok_and(|v| v == "1");
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            if e.is_auth() {
                log::error!(
                    "The ZwiftPower cookie is missing or expired. Log in again and update {}.",
                    ENV_COOKIE
                );
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config =
        Config::load_or_default(&cli.config)?.with_env_overrides(|k| std::env::var(k).ok());

    match cli.command {
        Command::Run {
            dry_run,
            always_notify,
            now,
        } => {
            let mut config = config;
            config.run.dry_run |= dry_run;
            config.run.always_notify |= always_notify;
            config.validate()?;

            let source = ZwiftPowerSource::new(&config)?;
            let store = LocalSeenStore::new(&config.state.path);
            let notifier: Box<dyn Notifier> = if config.run.dry_run {
                Box::new(LogNotifier)
            } else {
                Box::new(DiscordNotifier::new(&config)?)
            };

            log::info!("Podium run starting for {}", source.url());
            let outcome = pipeline::run_weekly(
                &config,
                &source,
                notifier.as_ref(),
                &store,
                now.unwrap_or_else(Utc::now),
            )
            .await?;

            log::info!(
                "Done: parsed={} podiums={} new={} delivered={} saved={}",
                outcome.parsed,
                outcome.podiums,
                outcome.new_podiums,
                outcome.delivered,
                outcome.state_saved
            );
        }

        Command::Parse { file } => {
            let html = tokio::fs::read_to_string(&file).await?;
            let extractor = RowExtractor::new(&config.extractor, &config.source.base_url)?;
            let records = extractor.extract(&html);

            log::info!("Extracted {} results from {}", records.len(), file.display());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            RowExtractor::new(&config.extractor, &config.source.base_url)?;
            log::info!("✓ Config OK");
        }

        Command::Info => {
            log::info!("Team page: {}", config.team_url());

            let store = LocalSeenStore::new(&config.state.path);
            if !store.path().exists() {
                log::info!("Seen store {} not found yet.", store.path().display());
                return Ok(());
            }
            match store.try_load().await {
                Ok(seen) => log::info!(
                    "Seen store {}: {} results",
                    store.path().display(),
                    seen.len()
                ),
                Err(e) => log::warn!(
                    "Seen store {} is unreadable and will be treated as empty: {}",
                    store.path().display(),
                    e
                ),
            }
        }
    }

    Ok(())
}
