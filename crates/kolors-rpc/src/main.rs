//! Kolors RPC Server - JSON-RPC backend for the Kolors color tools.
//!
//! This binary provides a JSON-RPC 2.0 server that wraps the kolors-core
//! library: combination editing, position maintenance and the one-time
//! legacy migration.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use kolors_core::{AppConfig, KolorsApi, MigrationConfig};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "kolors-rpc")]
#[command(about = "JSON-RPC server for Kolors")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// SQLite database file (defaults to kolors.sqlite in the working directory)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Keep all data in memory instead of a database file
    #[arg(long, conflicts_with = "database")]
    in_memory: bool,

    /// Marker prepended to migrated combination names
    #[arg(long)]
    name_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting {} RPC Server", AppConfig::APP_NAME);

    let mut migration_config = MigrationConfig::default();
    if let Some(prefix) = args.name_prefix {
        migration_config.name_prefix = prefix;
    }

    let mut builder = KolorsApi::builder().migration_config(migration_config);
    if !args.in_memory {
        let database = match args.database {
            Some(path) => path,
            None => std::env::current_dir()?.join(AppConfig::DATABASE_FILENAME),
        };
        info!("Database: {}", database.display());
        builder = builder.database_path(database);
    }
    let api = builder.build()?;

    // Start the server
    let addr = server::start_server(api, &args.host, args.port).await?;

    // Print port for the launching process to read (intentional stdout)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
