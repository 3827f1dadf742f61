use crate::cli::ServeArgs;
use crate::infra::{AppState, ClubGateway};
use crate::routes::with_club_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use clube_admin::config::AppConfig;
use clube_admin::error::AppError;
use clube_admin::messaging::HttpMessageGateway;
use clube_admin::telemetry;
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

    let gateway = Arc::new(ClubGateway::connect(&config)?);
    let messenger = Arc::new(HttpMessageGateway::new(&config.messaging)?);
    info!(relay = messenger.endpoint(), "whatsapp relay configured");

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store: gateway.label(),
    };

    let app = with_club_routes(gateway, messenger)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "club administration api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
