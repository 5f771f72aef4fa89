use crate::cli::ServeArgs;
use crate::infra::{directory_service, seed_directory, AppState};
use crate::routes::with_directory_routes;
use arc_directory::config::AppConfig;
use arc_directory::error::AppError;
use arc_directory::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = directory_service();
    if let Some(summary) = seed_directory(&directory, &config.directory)? {
        info!(
            providers = summary.providers_imported,
            categories = summary.categories_created,
            "directory seeded"
        );
    }

    let app = with_directory_routes(Arc::new(directory))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "provider directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}
