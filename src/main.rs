use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod services;
mod storage;

use config::Config;
use services::{push::PushService, scheduler};
use storage::uploads::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub uploads: UploadStore,
    pub push: PushService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pt_tracker_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load();
    tracing::info!("Starting server in {} mode", config.server.environment);

    // Initialize database pool
    let db = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    // Initialize upload storage
    let uploads = UploadStore::new(&config.storage).await?;
    if uploads.is_s3() {
        tracing::info!("Using bucket storage for uploads");
    } else {
        tracing::info!(
            "Using local disk for uploads at {}",
            config.storage.uploads_dir
        );
    }

    // Initialize push dispatch
    let push = PushService::new(db.clone(), &config.push);

    // Start the session reminder loop
    let reminders = scheduler::start(db.clone(), push.clone(), config.scheduler.tick_interval);
    tracing::info!(
        "Session reminder scheduler running every {:?}",
        config.scheduler.tick_interval
    );

    // Create app state
    let state = AppState {
        db,
        config: Arc::new(config.clone()),
        uploads: uploads.clone(),
        push,
    };

    // Build router
    let mut app = Router::new()
        .route("/api/health", get(health_check))
        .nest("/api", api::router::create_router(state.clone()));

    // Local uploads are served straight off disk; bucket storage has its own URL
    if !uploads.is_s3() {
        app = app.nest_service("/uploads", ServeDir::new(&config.storage.uploads_dir));
    }

    let app = app
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminders.stop().await;
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
