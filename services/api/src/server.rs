use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_scheduling_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shiftwise::config::AppConfig;
use shiftwise::error::AppError;
use shiftwise::scheduling::{InMemorySchedulingRepository, RecordingNotifier, SchedulingService};
use shiftwise::telemetry;
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
    if let Some(policy) = args.overlap_policy.take() {
        config.scheduling.vacation_overlap_policy = policy.into();
    }

    telemetry::init(config.environment, &config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemorySchedulingRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduling_service = Arc::new(SchedulingService::new(
        repository,
        notifier,
        config.scheduling.vacation_overlap_policy,
    ));

    let app = with_scheduling_routes(scheduling_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        overlap_policy = config.scheduling.vacation_overlap_policy.label(),
        "shift scheduling service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
