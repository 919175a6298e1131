use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discovery_service::config::Config;
use discovery_service::db::RestCatalogSource;
use discovery_service::handlers::{configure, DiscoveryHandlerState};
use discovery_service::services::{FeedController, TrendingService};

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},actix_web=info", default_filter).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.log_level);

    info!(
        "Starting discovery-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Environment: {}", config.app.env);

    let source = RestCatalogSource::new(&config.catalog).context("Failed to build catalog client")?;
    let service = TrendingService::new(
        Arc::new(source),
        config.discovery.clone(),
        config.catalog.timeout(),
    );
    let controller = Arc::new(FeedController::new(service));

    // Warm the list so the first visitor does not wait on the catalog
    let warm = controller.clone();
    actix_rt::spawn(async move {
        let snapshot = warm.refresh().await;
        info!(
            "Initial trending load: status={}, items={}",
            snapshot.state.as_str(),
            snapshot.state.items().len()
        );
    });

    let state = web::Data::new(DiscoveryHandlerState { controller });
    let bind_addr = (config.app.host.clone(), config.app.port);
    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(bind_addr)
        .context("Failed to bind HTTP listener")?
        .run()
        .await
        .context("HTTP server error")?;

    Ok(())
}
