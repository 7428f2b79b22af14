use crate::cli::ServeArgs;
use crate::infra::{demo_listings, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use housing_allocation::allocation::{AllocationEngine, InventoryStore};
use housing_allocation::config::AppConfig;
use housing_allocation::error::AppError;
use housing_allocation::telemetry::{self, LogTarget};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogTarget::Service)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let inventory = if config.allocation.seed_demo_inventory {
        InventoryStore::with_listings(demo_listings())?
    } else {
        InventoryStore::new()
    };
    let engine = Arc::new(AllocationEngine::new(inventory));
    let seeded = engine.inventory_summary();

    let app = with_service_routes(engine, config.allocation.match_limit)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        listings = seeded.listings,
        available_units = seeded.available_units,
        "housing allocation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
