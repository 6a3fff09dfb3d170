use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use playdeck_core::{
    config::{self, AppConfig},
    GameRecord, HttpAssetSource, Library, LibrarySettings, SteamStore,
};
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "playdeck", version, about = "Scan, describe and launch your local games")]
struct Cli {
    /// Use this config file instead of the default one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the library folder and list the games found.
    Scan {
        /// Only show games matching this text.
        #[arg(long)]
        filter: Option<String>,
        /// Print full records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Search the store for a title.
    Search {
        /// Title to look for.
        query: String,
    },
    /// Fetch store metadata and artwork for a game.
    Fetch {
        /// Game id or name.
        game: String,
        /// Store app id (see `search`).
        app_id: String,
    },
    /// Open a game's executable with the system handler.
    Launch {
        /// Game id or name.
        game: String,
        /// Relative path of the action to run instead of the default one.
        #[arg(long)]
        action: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

/// Everything the commands need, built once at startup.
struct AppContext {
    config: AppConfig,
    library: Library,
}

impl AppContext {
    fn new(config: AppConfig) -> Self {
        let library = Library::new(LibrarySettings::from_config(&config));
        Self { config, library }
    }

    async fn discovered(&self) -> Result<&Library> {
        if !self.config.has_library() {
            return Err(anyhow!(
                "library_root is not set; edit {} or set PLAYDECK_LIBRARY_ROOT",
                config::config_path().display()
            ));
        }
        self.library.discover().await?;
        Ok(&self.library)
    }

    async fn game(&self, needle: &str) -> Result<GameRecord> {
        self.discovered()
            .await?
            .find(needle)
            .ok_or_else(|| anyhow!("no game matching '{needle}'"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };
    debug!(
        library_root = %config.library_root.display(),
        extensions = %config.extensions,
        exclusions = %config.exclusions,
        "configuration loaded"
    );
    let context = AppContext::new(config);

    match cli.command {
        Command::Scan { filter, json } => {
            let games = context
                .discovered()
                .await?
                .games_matching(filter.as_deref().unwrap_or_default());
            if json {
                println!("{}", serde_json::to_string_pretty(&games)?);
            } else {
                for game in &games {
                    println!(
                        "{}\t{}\t{}",
                        game.id,
                        game.name,
                        game.actions.default.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Command::Search { query } => {
            let store = SteamStore::from_config(&context.config)?;
            for hit in store.search(&query).await? {
                println!("{}\t{}", hit.id, hit.name);
            }
        }
        Command::Fetch { game, app_id } => {
            let mut record = context.game(&game).await?;
            let store = SteamStore::from_config(&context.config)?;
            let details = store
                .details(&app_id)
                .await
                .with_context(|| format!("failed to fetch store data for {app_id}"))?;
            record.apply_store_metadata(details);

            let assets = HttpAssetSource::new()?;
            let saved = context
                .library
                .save_game_metadata(&assets, record)
                .await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        Command::Launch { game, action } => {
            let record = context.game(&game).await?;
            let target = context.library.launch(&record, action.as_deref())?;
            println!("launched {}", target.display());
        }
        Command::Config => {
            println!("# {}", config::config_path().display());
            println!("{}", serde_json::to_string_pretty(&context.config)?);
        }
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(config::CONFIG_DIR)
        .join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("playdeck.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
