use crate::cli::ServeArgs;
use crate::infra::{sample_family, AppState, InMemoryGuestListStore, InMemoryMemberDirectory};
use crate::routes::with_admission_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use club_admission::admission::{AdmissionService, Clock, SystemClock};
use club_admission::config::{AppConfig, AppEnvironment};
use club_admission::error::AppError;
use club_admission::telemetry;
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

    let clock = Arc::new(SystemClock);
    let directory = if config.environment == AppEnvironment::Production {
        InMemoryMemberDirectory::default()
    } else {
        info!(titular = crate::infra::SAMPLE_TITULAR_ID, "seeding sample family");
        InMemoryMemberDirectory::seeded([sample_family(clock.today())])
    };

    let admission_service = Arc::new(AdmissionService::new(
        Arc::new(InMemoryGuestListStore::default()),
        Arc::new(directory),
        clock,
        config.admission.clone(),
    ));

    let app = with_admission_routes(admission_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        restricted_dates = config.admission.restricted_dates.len(),
        "club admission service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
