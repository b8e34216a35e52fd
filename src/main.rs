mod auth;
mod config;
mod error;
mod report;
mod routes;
mod score;
mod server;
mod slug;
mod state;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::{CliArgs, DashboardConfig, API_KEY_HEADER};
use report::service::ReportService;
use report::store::SqliteStore;
use report::Project;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mutadash=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    let config = DashboardConfig::from_args(&args);
    url::Url::parse(&config.base_url)
        .with_context(|| format!("invalid base URL: {}", config.base_url))?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create data dir {:?}", config.data_dir))?;
    let store = Arc::new(SqliteStore::open(&config.db_path())?);

    // Registration mode: create the project, print the key once, exit.
    if let Some(slug) = args.register.as_deref() {
        return register_project(store.as_ref(), slug);
    }

    info!("Starting mutadash v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.db_path());
    info!("Base URL: {}", config.base_url);
    info!("Require enabled projects: {}", config.require_enabled);

    let port = config.port;
    let reports = ReportService::new(store, config.require_enabled);
    let state = Arc::new(AppState::new(config, reports));

    // Build and start HTTP server
    let router = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Dashboard API listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard API shutting down");
    Ok(())
}

fn register_project(store: &SqliteStore, slug: &str) -> anyhow::Result<()> {
    let (owner, name) = slug
        .split_once('/')
        .context("project must be named <owner>/<name>")?;
    if owner.is_empty() || name.is_empty() {
        anyhow::bail!("project must be named <owner>/<name>");
    }

    let (key, hash) = auth::generate_api_key();
    store.create_project(&Project {
        name: slug.to_string(),
        owner: owner.to_string(),
        enabled: true,
        api_key_hash: hash,
    })?;

    println!("Registered project {}", slug);
    println!("API key: {}", key);
    println!("Send reports with a \"{}: {}\" header.", API_KEY_HEADER, key);
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
