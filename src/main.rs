use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wcs_analyzer::api::{build_router, state::AppState};
use wcs_analyzer::calculate::Analyzer;
use wcs_analyzer::config::AppConfig;
use wcs_analyzer::fetch::{collect_batch, MatchServiceClient, MatchSource};
use wcs_analyzer::models::{MatchEntry, ParticipantId, Report};

#[derive(Parser)]
#[command(name = "wcs-analyzer")]
#[command(about = "Win Contribution Score analyzer for team-match batches")]
#[command(version)]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a match batch stored as JSON
    Analyze {
        /// Batch file: an array of `{ "id", "data" }` entries, most recent first
        #[arg(long)]
        input: PathBuf,

        /// Target participant id
        #[arg(long)]
        player: String,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Collect a player's recent matches from the match service and analyze them
    Fetch {
        /// Player id or platform id
        #[arg(long)]
        player: String,

        /// Also save the collected batch to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // Logs go to stderr so report JSON on stdout stays clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            cli.json_logs
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.json_logs)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    tracing::debug!("Starting wcs-analyzer v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            player,
            pretty,
        } => {
            let contents = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read batch file {}", input.display()))?;
            let batch: Vec<MatchEntry> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid batch file {}", input.display()))?;
            tracing::info!("Loaded {} matches from {}", batch.len(), input.display());

            let analyzer = Analyzer::new(config.scoring.clone());
            let report = analyzer.analyze(&ParticipantId::from(player.trim()), &batch)?;
            print_report(&report, pretty)?;
        }
        Commands::Fetch {
            player,
            output,
            pretty,
        } => {
            let client = Arc::new(
                MatchServiceClient::new(config.fetch.clone())
                    .context("Failed to create match service client")?,
            );
            let analyzer = analyzer_with_units(&config, &client).await;

            let target = client
                .resolve_player(&player)
                .await
                .with_context(|| format!("Failed to resolve player {}", player))?;
            let batch = collect_batch(client.clone(), &target, &config.collection)
                .await
                .with_context(|| format!("Failed to collect matches for {}", target))?;

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&batch)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write batch to {}", path.display()))?;
                tracing::info!("Saved {} matches to {}", batch.len(), path.display());
            }

            let report = analyzer.analyze(&target, &batch)?;
            print_report(&report, pretty)?;
        }
        Commands::Serve { host, port } => {
            let client = Arc::new(
                MatchServiceClient::new(config.fetch.clone())
                    .context("Failed to create match service client")?,
            );
            let analyzer = analyzer_with_units(&config, &client).await;

            let state = AppState {
                analyzer: Arc::new(analyzer),
                source: client,
                collection: Arc::new(config.collection.clone()),
                cors_origin: config.server.cors_origin.clone(),
            };
            let app = build_router(state);
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

/// Analyzer with unit names from the service; falls back to plain unit
/// ids when the catalog cannot be loaded.
async fn analyzer_with_units(config: &AppConfig, client: &MatchServiceClient) -> Analyzer {
    let analyzer = Analyzer::new(config.scoring.clone());
    match client.unit_catalog().await {
        Ok(catalog) if !catalog.is_empty() => analyzer.with_unit_names(Arc::new(catalog)),
        Ok(_) => analyzer,
        Err(e) => {
            tracing::warn!("Unit names unavailable: {}", e);
            analyzer
        }
    }
}

fn print_report(report: &Report, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    println!("{}", json);
    Ok(())
}
