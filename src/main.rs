//! Item API server

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use item_api::api;
use item_api::config::Config;

#[derive(Parser)]
#[command(name = "item-api")]
#[command(about = "Minimal JSON item API with schema validation")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Disable the CORS layer
        #[arg(long)]
        no_cors: bool,
    },

    /// Print the OpenAPI document
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before the filter reads RUST_LOG
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("item_api={},tower_http={}", log_level, log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        no_cors: false,
    }) {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => {
            let config = apply_overrides(config, host, port, no_cors);
            serve(config).await?;
        }

        Commands::Openapi => {
            println!("{}", api::openapi_json()?);
        }
    }

    Ok(())
}

/// CLI flags take precedence over the config file
fn apply_overrides(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    no_cors: bool,
) -> Config {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if no_cors {
        config.cors.enabled = false;
    }
    config
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let router = api::create_router(&config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!(%addr, "Listening for HTTP traffic");
    println!("Item API running at http://{}", addr);
    println!("  API Docs: http://{}/docs", addr);
    println!("  Health:   http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
