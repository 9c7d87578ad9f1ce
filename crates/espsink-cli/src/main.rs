//! CLI for espsink: in-memory telemetry sink for ESP32 field devices.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "espsink")]
#[command(about = "espsink: telemetry sink and health dashboard for ESP32 devices")]
#[command(version = espsink_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (device ingestion, data table, chart, dashboard)
    Server {
        /// Port to listen on [default: 8080]
        #[arg(long)]
        port: Option<u16>,

        /// Bind address [default: 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Directory of static files served for unmatched paths
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Normalize a device payload and print the resulting record.
    /// Exits non-zero if the payload would be rejected.
    Validate {
        /// JSON file to check, or "-" for stdin
        #[arg(default_value = "-")]
        path: String,
    },
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            port,
            host,
            static_dir,
        } => commands::server::run(host, port, static_dir),
        Commands::Validate { path } => commands::validate::run(&path),
    }
}
