//! Campus Events - event catalog and faculty submission service
//!
//! Serves the catalog and submission API, and offers quick catalog queries
//! from the command line.

use anyhow::{Context, Result};
use campus_events::{
    api::build_app,
    config::CampusEventsConfig,
    events::{filter::FilterParams, EventStore, FilterSpec},
    submission::{EventService, HttpEventService, WorkflowManager},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "campus-events")]
#[command(version)]
#[command(about = "Campus event catalog and faculty submission service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CAMPUS_EVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List catalog events matching a filter
    List {
        /// Case-insensitive text matched against the event title
        #[arg(short, long)]
        query: Option<String>,

        /// Category, or "all"
        #[arg(long)]
        category: Option<String>,

        /// Approval status, or "all"
        #[arg(long)]
        status: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show catalog statistics
    Stats,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("campus_events={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => CampusEventsConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CampusEventsConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::List {
            query,
            category,
            status,
            json,
        } => {
            let params = FilterParams {
                q: query,
                category,
                status,
            };
            let spec = FilterSpec::try_from(params).map_err(anyhow::Error::msg)?;
            list_events(&config, &spec, json).await?;
        }
        Commands::Stats => {
            show_stats(&config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn open_store(config: &CampusEventsConfig) -> Result<Arc<EventStore>> {
    let store = EventStore::new(config.storage.base_dir.clone())
        .await
        .with_context(|| {
            format!(
                "failed to open event store at {}",
                config.storage.base_dir.display()
            )
        })?;
    Ok(Arc::new(store))
}

async fn run_server(
    mut config: CampusEventsConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!("Starting Campus Events server");

    let store = open_store(&config).await?;
    let service: Arc<dyn EventService> = match &config.submission.service_url {
        Some(url) => {
            tracing::info!(url = %url, "Submissions go to remote catalog");
            Arc::new(HttpEventService::new(
                url.clone(),
                config.submission.service_timeout(),
            )?)
        }
        None => store.clone(),
    };
    let manager = Arc::new(
        WorkflowManager::new(service, config.submission.confirmation_delay())
            .with_idle_timeout(config.submission.idle_timeout()),
    );
    let app = build_app(store, manager, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Campus Events is running. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn list_events(config: &CampusEventsConfig, spec: &FilterSpec, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let events = store.list(spec).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events match the current filters.");
        return Ok(());
    }

    for event in &events {
        println!(
            "{:<12} {:<10} {} {}  {}  @ {}  ({}/{})",
            event.status.to_string(),
            event.category.to_string(),
            event.date,
            event.time.format("%H:%M"),
            event.title,
            event.location,
            event.registrations,
            event.capacity,
        );
    }
    println!();
    println!("{} event(s)", events.len());
    Ok(())
}

async fn show_stats(config: &CampusEventsConfig) -> Result<()> {
    let store = open_store(config).await?;
    let stats = store.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn show_config(config: Option<&CampusEventsConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
