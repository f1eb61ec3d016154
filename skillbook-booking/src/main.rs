use std::sync::Arc;
use std::time::Duration;

use axum::middleware::from_fn;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod availability;
mod config;
mod events;
mod models;
mod payments;
mod routes;
mod schema;
mod services;
mod timeslot;

use config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use payments::PaymentGateway;
use skillbook_shared::cache::QueryCache;
use skillbook_shared::clients::db::{create_pool, DbPool};
use skillbook_shared::clients::rabbitmq::RabbitMqClient;

use crate::models::Teacher;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMqClient,
    pub payments: PaymentGateway,
    pub teacher_cache: QueryCache<Teacher>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skillbook_shared::middleware::init_tracing("skillbook-booking");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = skillbook_shared::middleware::init_metrics();

    let db = create_pool(&config.database_url)?;

    let rabbitmq = RabbitMqClient::connect(&config.rabbitmq_url).await?;
    let payments = PaymentGateway::new(
        &config.payment_key_id,
        &config.payment_key_secret,
        &config.payment_api_base,
    )?;
    let teacher_cache =
        QueryCache::with_system_clock(Duration::from_secs(config.teacher_cache_ttl_secs));

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        payments,
        teacher_cache,
        metrics_handle,
    });

    let app = Router::new()
        // Health + metrics
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Teacher profiles
        .route("/teachers", post(routes::teachers::register_teacher))
        .route("/teachers/me", patch(routes::teachers::update_me))
        .route("/teachers/:id", get(routes::teachers::get_teacher))
        // Availability resolution
        .route(
            "/teachers/:id/bookable-dates",
            get(routes::slots::get_bookable_dates),
        )
        .route("/teachers/:id/slots", get(routes::slots::get_open_slots))
        // Availability management
        .route(
            "/availability/weekly",
            get(routes::availability::list_weekly).post(routes::availability::create_weekly),
        )
        .route(
            "/availability/weekly/:id",
            delete(routes::availability::delete_weekly),
        )
        .route(
            "/availability/exceptions",
            get(routes::availability::list_exceptions)
                .post(routes::availability::create_exception),
        )
        .route(
            "/availability/exceptions/:id",
            delete(routes::availability::delete_exception),
        )
        // Payments + bookings
        .route("/payments/order", post(routes::payments::create_order))
        .route(
            "/bookings",
            get(routes::bookings::list_bookings).post(routes::bookings::create_booking),
        )
        .layer(from_fn(skillbook_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "skillbook-booking starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
