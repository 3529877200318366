use crate::cli::ServeArgs;
use crate::infra::{AppState, Services};
use crate::routes::with_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use econ_mood::config::AppConfig;
use econ_mood::error::AppError;
use econ_mood::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let services = Services::from_config(&config)?;
    if !services.feedback.is_enabled() {
        warn!("feedback endpoint not configured; subscribe and contact will report disabled");
    }

    // Warm the default dataset so the first score request does not pay for the load.
    match services.mood.provider().series_map(None).await {
        Ok(loaded) => info!(
            requested = %loaded.requested,
            served = %loaded.served,
            series = loaded.series.len(),
            "indicator data warmed"
        ),
        Err(err) => warn!(error = %err, "indicator data unavailable at startup"),
    }

    let app = with_routes(services.mood, services.feedback)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "economic mood service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
