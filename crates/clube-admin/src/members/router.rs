use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use super::{MemberDirectory, MemberSearch};
use crate::domain::Member;
use crate::error::ClubError;
use crate::gateway::PersistenceGateway;

pub fn member_router<G>(directory: Arc<MemberDirectory<G>>) -> Router
where
    G: PersistenceGateway + 'static,
{
    Router::new()
        .route("/api/v1/members", get(search_handler::<G>))
        .route(
            "/api/v1/members/by-tax-id/:tax_id",
            get(tax_id_handler::<G>),
        )
        .with_state(directory)
}

async fn search_handler<G>(
    State(directory): State<Arc<MemberDirectory<G>>>,
    Query(filter): Query<MemberSearch>,
) -> Result<Json<Vec<Member>>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(directory.search(filter).await?))
}

async fn tax_id_handler<G>(
    State(directory): State<Arc<MemberDirectory<G>>>,
    Path(tax_id): Path<String>,
) -> Result<Json<Member>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(directory.find_by_tax_id(&tax_id).await?))
}
