// server/src/main.rs
//
// Entry point for the hostel backend: parse arguments, load configuration,
// open the store, seed the first admin, and serve the REST API.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use lib::gateway::{HostelGateway, MemoryGateway, SledGateway};
use lib::reminders::HttpTextGenerator;
use rest_api::{AppState, load_hostel_config, run_rest_api_server};

#[derive(Debug, Parser)]
#[command(name = "hostel-server", about = "Hostel management backend")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run with a throwaway in-memory store instead of sled.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = load_hostel_config(args.config).context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_directory = data_dir.display().to_string();
    }

    let gateway: Arc<dyn HostelGateway> = if args.in_memory {
        info!("using in-memory store; data will not survive restarts");
        Arc::new(MemoryGateway::new())
    } else {
        Arc::new(
            SledGateway::open(&config.data_directory)
                .with_context(|| format!("failed to open store at {}", config.data_directory))?,
        )
    };

    security::seed_admin(gateway.as_ref(), &config.admin_email, &config.admin_password)
        .await
        .context("failed to seed admin account")?;

    let generator = Arc::new(HttpTextGenerator::new(
        config.text_api_url.clone(),
        config.text_api_key.clone(),
        config.text_model.clone(),
    ));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    let state = AppState::new(gateway, generator, config);
    run_rest_api_server(state, addr).await
}
