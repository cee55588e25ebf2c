mod clipboard;
mod config;
mod errors;
mod optimizer_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clipboard::{ArboardClipboard, ClipboardWriter, NoopClipboard};
use crate::config::Config;
use crate::optimizer_client::HttpOptimizer;
use crate::routes::build_router;
use crate::session::controller::SubmissionController;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aria client v{}", env!("CARGO_PKG_VERSION"));

    let optimizer = HttpOptimizer::new(
        &config.optimizer_api_url,
        Duration::from_secs(config.optimizer_timeout_secs),
    )?;
    info!(
        "Optimizer client initialized (endpoint: {}, timeout: {}s)",
        optimizer.endpoint(),
        config.optimizer_timeout_secs
    );

    let clipboard: Arc<dyn ClipboardWriter> = if config.clipboard_enabled {
        match ArboardClipboard::new() {
            Ok(clipboard) => Arc::new(clipboard),
            Err(e) => {
                warn!("System clipboard unavailable, copies will not reach it: {e}");
                Arc::new(NoopClipboard)
            }
        }
    } else {
        info!("System clipboard disabled");
        Arc::new(NoopClipboard)
    };

    let controller = SubmissionController::new(Arc::new(optimizer), clipboard);

    let state = AppState {
        controller,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
