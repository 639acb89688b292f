//! Dicotopo gazetteer server.
//!
//! Serves the gazetteer's places, historical labels and communes as a
//! read-only JSON:API service. `dicotopo load <dump.json>` fills the
//! database before serving.

#[cfg(feature = "sqlite")]
mod load;
mod model;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dicotopo_rest::{ServerConfig, create_app, init_logging};
use tracing::info;

#[cfg(feature = "sqlite")]
use dicotopo_store::backends::sqlite::SqliteBackend;

#[derive(Debug, Parser)]
#[command(name = "dicotopo", version)]
#[command(about = "Dicotopo gazetteer JSON:API server")]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the API (the default)
    Serve,
    /// Upsert the entities of a JSON dump into the database, then exit
    Load {
        /// JSON array of `{entity_type, id, attributes}` objects
        file: PathBuf,
    },
}

/// Opens the SQLite database named by the configuration and bootstraps its
/// schema.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    info!(database = %config.database_url, "Initializing SQLite backend");

    let backend = if config.database_url == ":memory:" {
        SqliteBackend::in_memory()?
    } else {
        SqliteBackend::open(&config.database_url)?
    };
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, api_path = %config.api_path(), "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { config, command } = Cli::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    match command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                port = config.port,
                host = %config.host,
                base_url = %config.base_url,
                sort_direction = %config.sort_direction,
                filter_values = %config.filter_values,
                "Starting Dicotopo server"
            );
            start(config).await
        }
        Command::Load { file } => load(config, file).await,
    }
}

#[cfg(feature = "sqlite")]
async fn start(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let registry = model::gazetteer_registry()?;
    let app = create_app(backend, registry, config.clone())?;
    serve(app, &config).await
}

#[cfg(feature = "sqlite")]
async fn load(config: ServerConfig, file: PathBuf) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let registry = model::gazetteer_registry()?;
    load::load_file(&backend, &file, &registry).await?;
    Ok(())
}

/// Fallback when the sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The server requires the 'sqlite' feature. \
         Build with: cargo build -p dicotopo --features sqlite"
    )
}

#[cfg(not(feature = "sqlite"))]
async fn load(_config: ServerConfig, _file: PathBuf) -> anyhow::Result<()> {
    anyhow::bail!("Loading requires the 'sqlite' feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["dicotopo", "--port", "9000"]).unwrap();
        assert_eq!(cli.config.port, 9000);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_load_command() {
        let cli = Cli::try_parse_from(["dicotopo", "--database-url", ":memory:", "load", "dump.json"])
            .unwrap();
        assert_eq!(cli.config.database_url, ":memory:");
        assert!(matches!(cli.command, Some(Command::Load { file }) if file == PathBuf::from("dump.json")));
    }
}
