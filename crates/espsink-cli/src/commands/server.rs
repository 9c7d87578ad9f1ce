use std::path::PathBuf;
use std::sync::Arc;

use espsink_core::TelemetrySink;
use espsink_server::ServerConfig;

/// Flags left unset fall back to [`ServerConfig::default`].
fn config_from_args(
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        static_dir,
    }
}

pub fn run(host: Option<String>, port: Option<u16>, static_dir: Option<PathBuf>) {
    let config = config_from_args(host, port, static_dir);
    let base = format!("http://{}", config.address());

    println!("📡 espsink v{}", espsink_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     POST /datos           Device report ingestion (JSON)");
    println!("     GET  /datos           Table of every received report");
    println!("     GET  /metricas        Time-series chart");
    println!("     GET  /estado          Health dashboard (auto-refresh 30 s)");
    println!("     GET  /api/data        All records as JSON");
    println!("     GET  /api/health      Aggregates + host stats as JSON");
    if let Some(dir) = &config.static_dir {
        println!("     GET  /*               Static files from {}", dir.display());
    }
    println!();
    println!("   Example:");
    println!(
        "     curl -X POST {base}/datos -d '{{\"ts\":1700000000000,\"sensors\":{{\"temp\":22.5}}}}'"
    );
    println!();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting async runtime: {e}");
            std::process::exit(1);
        }
    };
    let sink = Arc::new(TelemetrySink::new());
    if let Err(e) = runtime.block_on(espsink_server::run_server(sink, config)) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
