use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCertificateRepository};
use crate::routes::with_certificate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use certflow::config::AppConfig;
use certflow::error::AppError;
use certflow::telemetry;
use certflow::workflows::certificates::CertificateOutcomeService;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryCertificateRepository::default());
    let outcome_service = Arc::new(CertificateOutcomeService::new(
        repository,
        config.evaluation.clone(),
    ));

    let app = with_certificate_routes(outcome_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        min_insulation_mohm = config.evaluation.minimum_insulation_resistance_mohm,
        zs_limit_factor = config.evaluation.zs_limit_factor,
        "certificate outcome service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
