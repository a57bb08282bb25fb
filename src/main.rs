//! Cosmos Curator Backend
//!
//! A REST API server and background scheduler for AI-generated post content.
//! Runs the generation pipeline at configured times of day and delivers the
//! result over email; the same pipeline is available on demand over HTTP.

mod api;
mod config;
mod delivery;
mod error;
mod pipeline;
mod scheduler;
mod state;

use api::AppState;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use config::Config;
use delivery::{email::SmtpChannel, Dispatcher};
use pipeline::config::PipelineConfig;
use pipeline::gemini::{
    GeminiCaptionGenerator, GeminiClient, GeminiIdeaGenerator, GeminiImageGenerator,
    GeminiTagOptimizer,
};
use pipeline::PipelineOrchestrator;
use scheduler::Scheduler;
use serde::Serialize;
use state::{ConfigStore, JsonConfigStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded, server at {}", config.server_addr());

    // Load persisted curator settings
    let store: Arc<dyn ConfigStore> = Arc::new(JsonConfigStore::new(JsonConfigStore::default_path()));
    let mut settings = match store.load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load curator settings, using defaults: {}", e);
            state::CuratorSettings::default()
        }
    };
    settings.normalize();
    info!(
        target_count = settings.target_times.len(),
        "Curator settings loaded"
    );
    let settings = Arc::new(RwLock::new(settings));

    // Build the generation pipeline
    let pipeline_config = PipelineConfig::default();
    let gemini = Arc::new(GeminiClient::new(
        reqwest::Client::new(),
        config.gemini.api_key.clone(),
    ));
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Arc::new(GeminiIdeaGenerator::new(gemini.clone(), &pipeline_config)),
        Arc::new(GeminiCaptionGenerator::new(gemini.clone(), &pipeline_config)),
        Arc::new(GeminiImageGenerator::new(gemini.clone(), &pipeline_config)),
        Arc::new(GeminiTagOptimizer::new(gemini, &pipeline_config)),
        pipeline_config,
    ));

    // Build the delivery channel
    let channel = SmtpChannel::new(&config.smtp)?;
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(channel)));

    // Start the background scheduler
    let scheduler = Scheduler::new(
        settings.clone(),
        orchestrator.clone(),
        dispatcher.clone(),
        std::time::Duration::from_secs(config.scheduler.poll_interval_secs),
    );
    let scheduler_handle = scheduler.start();

    let app_state = Arc::new(AppState {
        settings,
        store,
        orchestrator,
        dispatcher,
    });

    // Build our application with routes
    let app = Router::new()
        // Health check
        .route("/api/health", get(health_check))
        // Post content API
        .route("/api/posts/generate", post(api::posts::generate_post))
        .route("/api/posts/send", post(api::posts::send_post))
        // Curator settings API
        .route(
            "/api/config",
            get(api::settings::get_settings).post(api::settings::update_settings),
        )
        // Scheduler API
        .route("/api/scheduler/next-fire", get(api::scheduler::get_next_fire))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(app_state);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let an in-flight scheduled run finish before exiting
    scheduler_handle.stop().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
