use crate::cli::ServeArgs;
use crate::infra::{AppState, ReportSources};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use cpi_report::config::AppConfig;
use cpi_report::error::AppError;
use cpi_report::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    if !config.dataset.path.exists() {
        warn!(
            path = %config.dataset.path.display(),
            "bundled dataset not found; workbook routes will fail until it is provided"
        );
    }
    if config.kosis.api_key.is_none() {
        warn!("KOSIS_API_KEY is not set; consumer routes will fail");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        sources: Arc::new(ReportSources::from_config(&config)?),
        upload_limit: config.upload.max_bytes,
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "cpi report service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
