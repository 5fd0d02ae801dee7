//! Job board server binary.
//!
//! ```text
//! job-board --config jobboard.toml
//! job-board --bind 0.0.0.0:8080 --database sqlite://data/jobs.db?mode=rwc
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use job_board::config::{load_config, AppConfig};
use job_board::db::Database;
use job_board::observability::{logging, metrics};
use job_board::HttpServer;

#[derive(Parser)]
#[command(name = "job-board")]
#[command(about = "Job listings web application", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `database.url`.
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(url) = cli.database {
        config.database.url = url;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "job-board starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_ttl_secs = config.session.ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let db = Database::connect(&config.database, &config.timeouts).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, db)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
