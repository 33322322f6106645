use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use evaluator_client::{EvaluationBackend, HttpEvaluationBackend, SubmissionController};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod render;
mod sessions;

use api::build_router;
use app_state::AppState;
use config::{backend_url_problem, load_settings};
use sessions::SessionRegistry;

#[derive(Parser, Debug)]
#[command(about = "Web form that sends interview answers to an evaluation backend")]
struct Args {
    /// TOML settings file; defaults to ./assessor.toml when present.
    #[arg(long, env = "ASSESSOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = load_settings(args.config.as_deref()).map_err(|error| {
        error!(%error, "failed to load settings");
        error
    })?;
    if let Some(problem) = backend_url_problem(settings.backend_url.as_deref()) {
        warn!(%problem, "backend address check failed; submissions will report errors");
    }

    let backend = HttpEvaluationBackend::new(settings.backend_url.clone())
        .with_timeout(Duration::from_secs(settings.request_timeout_secs));
    let backend_caption = settings
        .show_backend_caption
        .then(|| backend.describe());
    info!(
        endpoint = %backend.describe(),
        timeout_secs = settings.request_timeout_secs,
        "evaluation backend configured"
    );

    let state = AppState {
        controller: SubmissionController::new(Arc::new(backend)),
        sessions: SessionRegistry::new(settings.max_sessions),
        backend_caption,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "assessor listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
