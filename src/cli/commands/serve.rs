//! Serve command - start the HTTP API.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server::{create_app, AppState};
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;
    let output_dir = orchestrator.output_dir().display().to_string();

    let app = create_app(Arc::new(AppState { orchestrator }));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on {}", addr);

    Output::header("studyforge API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Generate", "POST /generate");
    println!();
    Output::kv("Output directory", &output_dir);
    Output::kv("Model ceiling", &format!("{} invocations/minute", settings.pipeline.max_rpm));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
