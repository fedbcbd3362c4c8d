//! services/cli/src/bin/classdocs.rs

use clap::Parser;
use cli_lib::{
    adapters::{DbAdapter, FileTextExtractor, OpenAiGenerationAdapter},
    commands::{self, Cli},
    config::Config,
    error::CliError,
    layout::DirLayout,
    state::AppState,
};
use async_openai::{config::OpenAIConfig, Client};
use classdocs_core::ports::GenerationService;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run(cli: Cli) -> Result<(), CliError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- 2. Prepare the Managed Directories ---
    let layout = DirLayout::new(&config.data_dir);
    layout.ensure().await?;

    // --- 3. Connect to Database & Run Migrations ---
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    db_adapter
        .run_migrations()
        .await
        .map_err(|e| CliError::Internal(format!("migration failed: {e}")))?;
    info!("database ready at {}", config.database_url);

    // --- 4. Initialize the Generation Collaborator (if configured) ---
    let generator: Option<Arc<dyn GenerationService>> =
        config.openai_api_key.as_ref().map(|api_key| {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let client = Client::with_config(openai_config);
            Arc::new(OpenAiGenerationAdapter::new(
                client,
                config.summary_model.clone(),
                config.quiz_model.clone(),
            )) as Arc<dyn GenerationService>
        });

    // --- 5. Build the Shared AppState & Dispatch ---
    let state = AppState {
        db: db_adapter,
        generator,
        extractor: Arc::new(FileTextExtractor),
        config: config.clone(),
        layout,
    };

    commands::dispatch(&state, cli).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
