use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;
mod video;

use config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use skillbook_shared::clients::db::{create_pool, DbPool};
use skillbook_shared::clients::rabbitmq::RabbitMqClient;
use skillbook_shared::clients::redis::RedisClient;
use video::VideoClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMqClient,
    pub redis: RedisClient,
    pub video: VideoClient,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skillbook_shared::middleware::init_tracing("skillbook-classroom");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = skillbook_shared::middleware::init_metrics();

    let db = create_pool(&config.database_url)?;

    let rabbitmq = RabbitMqClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;
    let video = VideoClient::new(
        &config.video_api_key,
        &config.video_api_base,
        &config.video_domain,
    )?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        video,
        metrics_handle,
    });

    // Bookings mirror subscriber
    let subscriber_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_booking_created(subscriber_state).await {
            tracing::error!(error = %e, "booking.created subscriber exited");
        }
    });

    let app = Router::new()
        // Health + metrics
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Class lifecycle
        .route("/classes/start", post(routes::classes::start_class))
        .route("/classes/join", post(routes::classes::join_class))
        .route("/classes/status", get(routes::classes::class_status))
        .route("/classes/end", post(routes::classes::end_class))
        .route("/classes/room", post(routes::classes::create_room))
        .layer(from_fn(skillbook_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "skillbook-classroom starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
