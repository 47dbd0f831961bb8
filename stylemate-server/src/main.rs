//! stylemate-server - Remote Collection API
//!
//! Serves per-user wardrobe collections, the image blob store and the AI
//! gateway endpoints over HTTP.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stylemate_ai::{GeminiClient, StyleGateway};
use stylemate_common::auth::TokenVerifier;
use stylemate_common::config::{
    ensure_root_folder, load_toml_config, resolve_gemini_api_key, resolve_root_folder,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, SERVER_DB_FILE,
};
use stylemate_server::{build_router, db, AppState};

/// Command-line arguments for stylemate-server
#[derive(Parser, Debug)]
#[command(name = "stylemate-server")]
#[command(about = "Remote Collection API for StyleMate")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 5730]
    #[arg(short, long, env = "STYLEMATE_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "STYLEMATE_BIND")]
    bind: IpAddr,

    /// Folder holding the server database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(short, long, env = "STYLEMATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_toml_config(args.config.as_deref())?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("{},tower_http=info", config.logging.level))
            }),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting StyleMate server (stylemate-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    ensure_root_folder(&root_folder)?;

    let db_path = root_folder.join(SERVER_DB_FILE);
    info!("Database path: {}", db_path.display());

    let pool = match db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let verifier = TokenVerifier::from_config(&config.auth)?;
    if verifier.is_verifying() {
        info!("✓ Bearer tokens verified with HS256 secret");
    } else {
        warn!(
            "Token signatures are NOT verified (auth.allow_unverified_tokens = true). Development only."
        );
    }

    let mut state = AppState::new(pool.clone(), verifier)
        .with_max_body_bytes(config.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES));

    match resolve_gemini_api_key(&config) {
        Some(api_key) => {
            let client = GeminiClient::from_config(api_key, &config.gemini)
                .context("Failed to create Gemini client")?;
            info!("✓ AI gateway enabled (model {})", client.model());
            state = state.with_gateway(StyleGateway::new(Arc::new(client)));
        }
        None => {
            warn!("No Gemini API key configured; AI endpoints will return 500");
        }
    }

    let app = build_router(state);

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::new(args.bind, port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("stylemate-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
