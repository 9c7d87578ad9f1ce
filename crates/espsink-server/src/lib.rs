//! HTTP front end for the ESP32 telemetry sink.
//!
//! The device POSTs JSON reports to `/datos`; browsers read the same path as a
//! table, `/metricas` as a chart and `/estado` as a health dashboard. JSON
//! endpoints under `/api` expose the raw snapshot and aggregates.

pub mod levels;
pub mod views;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, Json, Redirect},
    routing::get,
};
use serde::Serialize;
use tower_http::services::ServeDir;

use espsink_core::{HealthSummary, HostSnapshot, Snapshot, TelemetrySink};

use crate::views::DashboardView;

/// Body returned for an accepted report.
pub const ACCEPTED_BODY: &str = "OK";
/// Body returned for a rejected report.
pub const REJECTED_BODY: &str = "Error parsing JSON";

/// Shared server state.
struct AppState {
    sink: Arc<TelemetrySink>,
}

/// Where and how to serve.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of static assets served for unmatched paths.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    #[serde(flatten)]
    summary: HealthSummary,
    server_uptime_secs: u64,
    started_unix_ms: u64,
    host: HostSnapshot,
}

async fn handle_ingest(State(state): State<Arc<AppState>>, body: Bytes) -> (StatusCode, &'static str) {
    match state.sink.ingest(&body) {
        Ok(_) => (StatusCode::OK, ACCEPTED_BODY),
        Err(_) => (StatusCode::BAD_REQUEST, REJECTED_BODY),
    }
}

async fn handle_table(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::render_table(&state.sink.snapshot()))
}

async fn handle_chart(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::render_chart(&state.sink.snapshot()))
}

async fn handle_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = DashboardView {
        health: state.sink.health(),
        host: HostSnapshot::collect(),
        server_uptime: state.sink.uptime(),
    };
    Html(views::render_dashboard(&view))
}

async fn handle_data(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.sink.snapshot())
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        summary: state.sink.health(),
        server_uptime_secs: state.sink.uptime().as_secs(),
        started_unix_ms: state.sink.started_unix_ms(),
        host: HostSnapshot::collect(),
    })
}

/// Build the axum router around a sink.
///
/// With `static_dir` set, unmatched paths (including `/`) fall through to the
/// files in that directory; otherwise `/` redirects to the data table.
pub fn build_router(sink: Arc<TelemetrySink>, static_dir: Option<PathBuf>) -> Router {
    let state = Arc::new(AppState { sink });

    let router = Router::new()
        .route("/datos", get(handle_table).post(handle_ingest))
        .route("/metricas", get(handle_chart))
        .route("/estado", get(handle_dashboard))
        .route("/api/data", get(handle_data))
        .route("/api/health", get(handle_health))
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(|| async { Redirect::to("/datos") })),
    }
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(sink: Arc<TelemetrySink>, config: ServerConfig) -> std::io::Result<()> {
    let app = build_router(sink, config.static_dir.clone());
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    let local: SocketAddr = listener.local_addr()?;
    log::info!("listening on http://{local}");
    if let Some(dir) = &config.static_dir {
        log::info!("serving static files from {}", dir.display());
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}
