use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::domain::{Election, ElectionStatus, Slate, TallyResult};
use super::service::ElectionService;
use crate::error::ClubError;
use crate::gateway::PersistenceGateway;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElectionListQuery {
    #[serde(default)]
    pub status: Option<ElectionStatus>,
}

pub fn election_router<G>(service: Arc<ElectionService<G>>) -> Router
where
    G: PersistenceGateway + 'static,
{
    Router::new()
        .route("/api/v1/elections", get(list_handler::<G>))
        .route(
            "/api/v1/elections/:election_id/result",
            get(result_handler::<G>),
        )
        .route(
            "/api/v1/elections/:election_id/slates",
            get(slates_handler::<G>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<G>(
    State(service): State<Arc<ElectionService<G>>>,
    Query(query): Query<ElectionListQuery>,
) -> Result<Json<Vec<Election>>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(service.list(query.status).await?))
}

pub(crate) async fn result_handler<G>(
    State(service): State<Arc<ElectionService<G>>>,
    Path(election_id): Path<String>,
) -> Result<Json<TallyResult>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(service.tally(&election_id).await?))
}

pub(crate) async fn slates_handler<G>(
    State(service): State<Arc<ElectionService<G>>>,
    Path(election_id): Path<String>,
) -> Result<Json<Vec<Slate>>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(service.slates(&election_id).await?))
}
