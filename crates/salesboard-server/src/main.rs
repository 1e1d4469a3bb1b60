//! CLI entry point for the dashboard server.

use anyhow::Result;
use clap::Parser;
use salesboard_core::DashboardConfig;
use salesboard_server::{ServerConfig, serve};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Interactive dashboard for a marketplace sale report",
    long_about = "Serves the sale-report dashboard over HTTP.\n\n\
                  EXAMPLES:\n  \
                  # Default report file, http://127.0.0.1:8080\n  \
                  salesboard-server\n\n  \
                  # Another export on another port\n  \
                  salesboard-server -i exports/may.csv --port 3000"
)]
struct Args {
    /// Path to the sale report CSV
    #[arg(short, long, default_value = salesboard_core::config::DEFAULT_REPORT_PATH)]
    input: String,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Rows served by the raw-data preview
    #[arg(long, default_value = "1000")]
    preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let dashboard = DashboardConfig::builder()
        .csv_path(&args.input)
        .preview_rows(args.preview_rows)
        .build()?;

    let server = ServerConfig {
        host: args.host,
        port: args.port,
    };

    serve(server, dashboard).await?;
    Ok(())
}
