use crate::cli::ServeArgs;
use crate::infra::{
    demo_evaluations, load_evaluations, load_penalty_table, AppState,
    InMemoryEvaluationRepository,
};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use site_audit::audits::{AuditScoringService, PenaltyEstimator};
use site_audit::config::AppConfig;
use site_audit::error::AppError;
use site_audit::telemetry;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let penalty_table = load_penalty_table(args.penalty_table.as_deref())?;
    let evaluations = match args.evaluations.as_deref() {
        Some(path) => load_evaluations(path)?,
        None => demo_evaluations()?,
    };
    info!(evaluations = evaluations.len(), "evaluation store seeded");

    let repository = Arc::new(InMemoryEvaluationRepository::seeded(evaluations));
    let estimator = PenaltyEstimator::from(&config.scoring);
    let scoring_service = Arc::new(AuditScoringService::new(
        repository,
        Arc::new(penalty_table),
        estimator,
    ));

    let app = with_scoring_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        correction_factor = estimator.correction_factor(),
        "site audit scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
