use anyhow::{Context, Result};
use vault_tool_server::config::{Config, LoggingConfig};
use vault_tool_server::registry::ToolRegistry;
use vault_tool_server::vault::NotesVault;
use vault_tool_server::{server, tools};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration
    let config_path =
        std::env::var("TOOL_SERVER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    // Initialize logging
    init_logging(&config.logging);
    log::info!("Starting vault tool server...");
    log::info!("Configuration loaded from {}", config_path);

    let vault = NotesVault::open(&config.notes)
        .await
        .context("Failed to open notes vault")?;

    let registry = ToolRegistry::new(tools::builtin(vault))
        .context("Failed to register tools")?;
    let bindings = registry.bindings();
    for binding in &bindings {
        log::info!("Route GET|POST {}", binding.path);
    }

    let app = server::router(bindings);
    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    println!("🗂️  Vault tool server is running!");
    println!("   Listening on http://{}", address);
    println!("   Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Ctrl+C received, shutting down");
}
