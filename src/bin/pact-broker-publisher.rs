//! Pact Broker Publisher CLI
//!
//! Publishes generated pact files to a Pact Broker

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pact_broker_publisher::{
    ArtifactInspector, BatchPublisher, BrokerEndpoint, ConfigLoadOptions, ConfigLoader,
    ParticipantLookup, PublishError, PublishOutcome, PublisherSettings, env_vars,
    find_pact_files,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Publish pact files to a Pact Broker
#[derive(Parser)]
#[command(name = "pact-broker-publisher")]
#[command(version)]
#[command(about = "Publish pact files to a Pact Broker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish all pact files in a directory
    Publish(PublishArgs),

    /// Show the participants of each pact file without publishing
    Inspect {
        /// Pact directory (defaults to ./pacts or pactDir from the config file)
        #[arg(value_name = "PACT_DIR")]
        pact_dir: Option<PathBuf>,

        /// Config file (defaults to ./.pact-publish.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct PublishArgs {
    /// Pact directory (defaults to ./pacts or pactDir from the config file)
    #[arg(value_name = "PACT_DIR")]
    pact_dir: Option<PathBuf>,

    /// Broker base URL (overrides PACT_BROKER_BASE_URL)
    #[arg(long)]
    broker_url: Option<String>,

    /// Consumer version (overrides CONSUMER_VERSION)
    #[arg(long)]
    consumer_version: Option<String>,

    /// Branch to tag the consumer version with
    #[arg(long)]
    branch: Option<String>,

    /// Extra tag for the consumer version (overrides PACT_TAG)
    #[arg(long)]
    tag: Option<String>,

    /// Config file (defaults to ./.pact-publish.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Abort the whole batch after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            if let Some(publish_error) = e.downcast_ref::<PublishError>() {
                for action in publish_error.suggested_actions() {
                    eprintln!("  - {}", action);
                }
            }
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish(args) => publish_command(args).await,
        Commands::Inspect { pact_dir, config } => inspect_command(pact_dir, config).await,
    }
}

/// Snapshot of the process environment handed to the config loader
fn env_snapshot() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

async fn load_settings(
    config: Option<PathBuf>,
    cli_args: PublisherSettings,
) -> Result<PublisherSettings> {
    let options = ConfigLoadOptions {
        project_path: PathBuf::from("."),
        config_path: config,
        env: env_snapshot(),
        cli_args,
    };

    Ok(ConfigLoader::load(options).await?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn publish_command(args: PublishArgs) -> Result<i32> {
    let json = args.json;
    let cli_args = PublisherSettings {
        broker_url: args.broker_url,
        consumer_version: args.consumer_version,
        branch: args.branch,
        tag: args.tag,
        pact_dir: args.pact_dir,
        ..Default::default()
    };

    let settings = load_settings(args.config, cli_args).await?;
    let pact_dir = settings.pact_dir();

    let Some(endpoint) = BrokerEndpoint::resolve(settings)? else {
        eprintln!(
            "SKIPPED: {} is not set. Set the environment variable to enable pact publishing.",
            env_vars::BROKER_BASE_URL
        );
        return Ok(0);
    };

    let broker_url = endpoint.base_url().to_string();

    if !json {
        println!("\n📦 pact-broker-publisher\n");
        println!("Broker: {} ({})", broker_url, endpoint.auth().describe());
        println!("Consumer version: {}", endpoint.consumer_version());
        println!("Pact directory: {}", pact_dir.display());
        if let Ok(pact_files) = find_pact_files(&pact_dir) {
            for pact_file in &pact_files {
                println!("  Found pact: {}", file_name(pact_file));
            }
        }
        println!();
    }

    let batch_publisher = BatchPublisher::connect(endpoint)?;

    let outcomes = match args.timeout_secs {
        Some(secs) => {
            let publish_all = batch_publisher.publish_all(&pact_dir);
            match tokio::time::timeout(Duration::from_secs(secs), publish_all).await {
                Ok(outcomes) => outcomes,
                Err(_) => {
                    eprintln!("\n❌ Publishing timed out after {}s", secs);
                    return Ok(1);
                }
            }
        }
        None => batch_publisher.publish_all(&pact_dir).await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("{}", outcome);
        }
    }

    Ok(print_summary(&outcomes, &broker_url))
}

/// Print the batch summary and return the exit code
///
/// The batch only succeeds when every outcome succeeded.
fn print_summary(outcomes: &[PublishOutcome], broker_url: &str) -> i32 {
    let failed = outcomes.iter().filter(|o| !o.success).count();

    if failed == 0 {
        eprintln!(
            "\n✅ Successfully published {} pact(s) to {}.",
            outcomes.len(),
            broker_url
        );
        0
    } else {
        eprintln!(
            "\n❌ {} of {} pact publish(es) failed",
            failed,
            outcomes.len()
        );
        1
    }
}

async fn inspect_command(pact_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<i32> {
    println!("\n🔍 Pact Inspection\n");

    let cli_args = PublisherSettings {
        pact_dir,
        ..Default::default()
    };
    let pact_dir = load_settings(config, cli_args).await?.pact_dir();

    if !pact_dir.is_dir() {
        println!("⚠️  Pact directory not found: {}", pact_dir.display());
        return Ok(1);
    }

    let pact_files = find_pact_files(&pact_dir)?;
    if pact_files.is_empty() {
        println!("⚠️  No pact JSON files found in: {}", pact_dir.display());
        return Ok(1);
    }

    let mut unreadable = 0;
    for pact_file in &pact_files {
        match ArtifactInspector::inspect(pact_file).await {
            ParticipantLookup::Found(pair) => {
                println!(
                    "  ✅ {}: {} -> {}",
                    file_name(pact_file),
                    pair.consumer,
                    pair.provider
                );
            }
            ParticipantLookup::NotFound { reason } => {
                unreadable += 1;
                println!("  ❌ {}: {}", file_name(pact_file), reason);
            }
        }
    }

    println!();
    Ok(if unreadable == 0 { 0 } else { 1 })
}
