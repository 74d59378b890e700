use crate::cli::ServeArgs;
use crate::infra::{AppState, JsonFileCarryForwardRepository};
use crate::routes::with_pricing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rent_pricing::config::AppConfig;
use rent_pricing::error::AppError;
use rent_pricing::telemetry;
use rent_pricing::workflows::pricing::{
    CarryForwardRepository, InMemoryCarryForwardRepository, PricingService,
};
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

    let policy = config.pricing.policy()?;
    info!(
        price_response = policy.price_response.label(),
        reference_term = policy.reference_term,
        "default pricing policy loaded"
    );

    match config.pricing.carry_forward_dir.clone() {
        Some(dir) => {
            info!(dir = %dir.display(), "persisting carry-forward baselines to disk");
            serve_with(config, JsonFileCarryForwardRepository::new(dir)).await
        }
        None => serve_with(config, InMemoryCarryForwardRepository::default()).await,
    }
}

async fn serve_with<R>(config: AppConfig, repository: R) -> Result<(), AppError>
where
    R: CarryForwardRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pricing_service = Arc::new(PricingService::new(Arc::new(repository)));
    let app = with_pricing_routes(pricing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rent pricing service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
