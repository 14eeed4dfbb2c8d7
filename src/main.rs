use clap::Parser;
use pantry::{
    cli::{commands, Cli, Commands},
    config::{providers::ProviderConfig, Settings},
    corpus::RecipeFilter,
    proxy::{routes, AppState, ProviderRegistry},
    Error, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pantry=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Rank {
            corpus,
            ingredients,
            semantic,
            diet,
            difficulty,
            max_time,
            limit,
        } => {
            let filter = RecipeFilter {
                diet,
                difficulty,
                max_time,
            };
            commands::rank(&settings, &corpus, ingredients, semantic, filter, limit).await?;
        }
        Commands::Coverage {
            corpus,
            ingredients,
            min_match,
            limit,
        } => {
            commands::coverage(&corpus, ingredients, min_match, limit)?;
        }
        Commands::Validate { corpus } => {
            commands::validate(&corpus)?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting embedding proxy");
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Provider configuration: the YAML file when present, the
    // conventional environment variables otherwise
    let provider_config = match ProviderConfig::from_file(&settings.upstream.config_path) {
        Ok(config) => {
            info!(
                "Loaded provider configuration: {} providers ({} enabled)",
                config.total_providers(),
                config.enabled_count()
            );
            config
        }
        Err(e) => {
            warn!(
                "Failed to load provider configuration from {}: {}",
                settings.upstream.config_path.display(),
                e
            );
            warn!("Falling back to GEMINI_API_KEY / OPENAI_API_KEY environment defaults");
            ProviderConfig::from_env()
        }
    };

    let registry = ProviderRegistry::from_config(
        &provider_config,
        Duration::from_secs(settings.upstream.timeout_seconds),
    )?;
    if registry.is_empty() {
        warn!("No provider credentials found; embed requests will be answered with 501");
    } else {
        info!(
            "Upstream providers ready: {}",
            registry.provider_names().join(", ")
        );
    }

    // Create application state
    let state = AppState {
        registry: Arc::new(registry),
        settings: settings.clone(),
    };

    // Create router with rate limiting
    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Pantry Embedding Proxy");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("\nAPI Endpoints:");
    println!("  POST /api/embed");
    println!("  GET  /health");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}
