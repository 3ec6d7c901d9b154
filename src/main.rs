use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mtg_meta_tracker::analysis::{analyze, LandTables, PlacementWeights, ReportOptions};
use mtg_meta_tracker::api::routes::auth::AuthKeys;
use mtg_meta_tracker::api::routes::scrape::ScrapeState;
use mtg_meta_tracker::api::{build_router, AppState};
use mtg_meta_tracker::cards::CardLookup;
use mtg_meta_tracker::config::AppConfig;
use mtg_meta_tracker::scrape::{ScrapeClient, ScrapeOptions};
use mtg_meta_tracker::storage::{self, DeckRepository, StorageConfig};

#[derive(Parser)]
#[command(name = "mtg-meta-tracker")]
#[command(about = "MTG tournament metagame tracker for mtgtop8 data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory (overrides data_dir from the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape tournament decks from mtgtop8
    Scrape {
        /// Format code (e.g. EDH, MO, ST)
        #[arg(long, default_value = "EDH")]
        format: String,

        /// Meta period label (e.g. "Last 2 Months")
        #[arg(long)]
        period: Option<String>,

        /// Raw meta id; takes precedence over --period
        #[arg(long)]
        meta: Option<u32>,

        /// Store filter passed through to the format page
        #[arg(long)]
        store: Option<String>,

        /// Scrape these event ids only, comma-separated
        #[arg(long)]
        events: Option<String>,

        /// File the scraped decks are written to
        #[arg(long)]
        output: String,
    },

    /// Build the metagame report from a deck file
    Analyze {
        /// Input decks JSON
        input: String,

        /// File the report is written to
        #[arg(long)]
        output: String,

        /// Weight shares by finishing bracket
        #[arg(long)]
        placement_weighted: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides server.host from the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))?;
    if let Some(dir) = cli.data_dir.as_deref() {
        config.data_dir = PathBuf::from(dir);
    }
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting mtg-meta-tracker v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Scrape {
            format,
            period,
            meta,
            store,
            events,
            output,
        } => {
            let event_ids: Vec<u64> = events
                .as_deref()
                .map(|raw| {
                    raw.split(',')
                        .filter_map(|part| part.trim().parse().ok())
                        .collect()
                })
                .unwrap_or_default();

            let options = ScrapeOptions {
                format_id: format,
                period,
                meta,
                store,
                event_ids,
            };

            let client = ScrapeClient::new(&config.scrape)?;
            let decks = client
                .scrape(&options, |msg| tracing::info!("{}", msg))
                .await?;

            storage::write_decks(std::path::Path::new(&output), &decks)?;

            println!("\n=== Scrape Results ===");
            println!("Decks scraped:    {}", decks.len());
            println!("Written to:       {}", output);
        }
        Commands::Analyze {
            input,
            output,
            placement_weighted,
        } => {
            let decks = storage::read_decks(std::path::Path::new(&input))?;
            if decks.is_empty() {
                eprintln!("No decks in {}", input);
                return Ok(());
            }

            // The runtime-edited land list applies to CLI runs too
            let storage_config = StorageConfig::new(config.data_dir.clone());
            let ignored = storage::read_ignored_lands(&storage_config)?;
            let lands = LandTables::with_nonbasics(ignored);
            let weights = PlacementWeights::default();
            let options =
                ReportOptions::new(&weights, &lands).with_placement_weighted(placement_weighted);

            let report = analyze(&decks, &options);
            storage::write_report(std::path::Path::new(&output), &report)?;

            println!("\n=== Analysis Results ===");
            println!("Decks analyzed:     {}", report.summary.total_decks);
            println!("Unique commanders:  {}", report.summary.unique_commanders);
            println!("Unique archetypes:  {}", report.summary.unique_archetypes);
            println!("Report written to:  {}", output);
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let storage_config = StorageConfig::new(config.data_dir.clone());
            let decks = storage::read_decks(&storage_config.decks_path())?;
            if !decks.is_empty() {
                tracing::info!("Loaded {} decks from {:?}", decks.len(), storage_config.decks_path());
            }
            let aliases = storage::read_aliases(&storage_config)?;
            let ignored = storage::read_ignored_lands(&storage_config)?;
            let cards = CardLookup::new(&storage_config)?;

            let state = AppState {
                config: Arc::new(config),
                storage: Arc::new(storage_config),
                repository: Arc::new(DeckRepository::new(decks)),
                aliases: Arc::new(tokio::sync::RwLock::new(aliases)),
                ignored_lands: Arc::new(tokio::sync::RwLock::new(ignored)),
                cards: Arc::new(tokio::sync::Mutex::new(cards)),
                auth: Arc::new(AuthKeys::from_env()),
                scrape_state: Arc::new(std::sync::Mutex::new(ScrapeState::default())),
            };
            let app = build_router(state);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
