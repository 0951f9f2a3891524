use axum::{middleware, routing::get};
use axum_helpers::{cors_layer_from_env, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::{MongoMovieRepository, MongoPeopleRepository, SwapiClient, WarmupService};
use domain_metrics::{
    DURATION_BUCKETS, DURATION_HISTOGRAM, MetricsService, MetricsSession, VictoriaMetricsClient,
};
use messaging::{BackgroundProcessor, InMemoryQueue};
use observability::{MetricsConfig, init_metrics, metrics_handler, metrics_middleware};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod api;
mod config;
mod jobs;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    init_metrics(
        &MetricsConfig::new(config.metrics_idle_timeout)
            .with_buckets(DURATION_HISTOGRAM, DURATION_BUCKETS),
    )?;

    info!("Connecting to MongoDB at {}", config.mongodb.url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());
    info!("Connected to MongoDB database: {}", config.mongodb.database());

    let people = MongoPeopleRepository::new(&db);
    let movies = MongoMovieRepository::new(&db);
    if let Err(e) = people.init_indexes().await {
        warn!(error = %e, "Failed to create people indexes");
    }
    if let Err(e) = movies.init_indexes().await {
        warn!(error = %e, "Failed to create movie indexes");
    }

    let state = AppState {
        config,
        mongo_client,
        db,
        queue: Arc::new(InMemoryQueue::new()),
        session: Arc::new(MetricsSession::new(chrono::Utc::now())),
    };

    let stats = MetricsService::new(
        VictoriaMetricsClient::new(&state.config.metrics_backend)?,
        state.session.clone(),
    );

    let (processor_tx, processor_rx) = watch::channel(false);
    let processor = BackgroundProcessor::new(
        state.queue.clone(),
        jobs::registry(stats.clone()),
        state.config.processor.clone(),
    );
    let processor_task = tokio::spawn(async move { processor.run(processor_rx).await });

    let source = SwapiClient::new(state.config.swapi.clone())?;
    let warmup = WarmupService::new(source, people, movies);
    tokio::spawn(async move {
        if let Err(e) = warmup.run().await {
            error!(error = %e, "Warmup failed");
        }
    });

    let cors = cors_layer_from_env(&state.config.environment)?;
    let app = create_router::<openapi::ApiDoc>(api::routes(&state, stats), cors)
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware));

    let server = state.config.server.clone();
    let shutdown_timeout = server.shutdown_timeout;
    info!(
        "Starting {} with graceful shutdown ({}s timeout)",
        state.config.app.name,
        shutdown_timeout.as_secs()
    );

    create_production_app(app, &server, shutdown_timeout, async move {
        info!("Shutting down: stopping background processor");
        let _ = processor_tx.send(true);
        if let Err(e) = processor_task.await {
            warn!(error = %e, "Background processor task ended abnormally");
        }
        drop(state.mongo_client);
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("SWAPI API shutdown complete");
    Ok(())
}
