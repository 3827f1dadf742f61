use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use clube_admin::access::{access_router, AccessService};
use clube_admin::elections::{election_router, ElectionService};
use clube_admin::finance::{finance_router, FinanceService};
use clube_admin::gateway::PersistenceGateway;
use clube_admin::members::{member_router, MemberDirectory};
use clube_admin::messaging::{messaging_router, MessageGateway};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_club_routes<G, M>(gateway: Arc<G>, messenger: Arc<M>) -> axum::Router
where
    G: PersistenceGateway + 'static,
    M: MessageGateway + 'static,
{
    access_router(Arc::new(AccessService::new(gateway.clone())))
        .merge(election_router(Arc::new(ElectionService::new(gateway.clone()))))
        .merge(member_router(Arc::new(MemberDirectory::new(gateway.clone()))))
        .merge(finance_router(Arc::new(FinanceService::new(gateway))))
        .merge(messaging_router(messenger))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "store": state.store })
    } else {
        json!({ "status": "initializing", "store": state.store })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
