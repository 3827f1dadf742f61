use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{AccessRecordFilter, PassageRequest, PersonKind, Venue};
use super::service::AccessService;
use crate::error::ClubError;
use crate::gateway::PersistenceGateway;

/// Body of an eligibility check.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub person_id: String,
    pub person_kind: PersonKind,
    #[serde(default)]
    pub venue: Venue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub venue: Option<Venue>,
}

/// Front-desk endpoints: evaluation, passage logging, and the access log.
pub fn access_router<G>(service: Arc<AccessService<G>>) -> Router
where
    G: PersistenceGateway + 'static,
{
    Router::new()
        .route("/api/v1/access/evaluate", post(evaluate_handler::<G>))
        .route("/api/v1/access/passages", post(passage_handler::<G>))
        .route("/api/v1/access/records", get(records_handler::<G>))
        .route("/api/v1/access/stats", get(stats_handler::<G>))
        .with_state(service)
}

pub(crate) async fn evaluate_handler<G>(
    State(service): State<Arc<AccessService<G>>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Response, ClubError>
where
    G: PersistenceGateway + 'static,
{
    let decision = service
        .evaluate(&request.person_id, request.person_kind, request.venue)
        .await?;
    Ok((StatusCode::OK, Json(decision)).into_response())
}

pub(crate) async fn passage_handler<G>(
    State(service): State<Arc<AccessService<G>>>,
    Json(request): Json<PassageRequest>,
) -> Result<Response, ClubError>
where
    G: PersistenceGateway + 'static,
{
    let record = service.record_passage(request).await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

pub(crate) async fn records_handler<G>(
    State(service): State<Arc<AccessService<G>>>,
    Query(filter): Query<AccessRecordFilter>,
) -> Result<Response, ClubError>
where
    G: PersistenceGateway + 'static,
{
    let records = service.recent_records(filter).await?;
    Ok((StatusCode::OK, Json(records)).into_response())
}

pub(crate) async fn stats_handler<G>(
    State(service): State<Arc<AccessService<G>>>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, ClubError>
where
    G: PersistenceGateway + 'static,
{
    let stats = service.gate_statistics(query.venue).await?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}
