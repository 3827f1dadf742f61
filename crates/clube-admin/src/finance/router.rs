use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{Delinquent, FinanceService, PaymentInput};
use crate::domain::Due;
use crate::error::ClubError;
use crate::gateway::PersistenceGateway;

#[derive(Debug, Clone, Deserialize)]
pub struct DelinquentQuery {
    #[serde(default = "default_min_overdue")]
    pub min_overdue: usize,
}

fn default_min_overdue() -> usize {
    1
}

pub fn finance_router<G>(service: Arc<FinanceService<G>>) -> Router
where
    G: PersistenceGateway + 'static,
{
    Router::new()
        .route("/api/v1/finance/delinquents", get(delinquents_handler::<G>))
        .route(
            "/api/v1/finance/dues/:due_id/payment",
            post(payment_handler::<G>),
        )
        .with_state(service)
}

async fn delinquents_handler<G>(
    State(service): State<Arc<FinanceService<G>>>,
    Query(query): Query<DelinquentQuery>,
) -> Result<Json<Vec<Delinquent>>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(service.delinquents(query.min_overdue).await?))
}

async fn payment_handler<G>(
    State(service): State<Arc<FinanceService<G>>>,
    Path(due_id): Path<String>,
    Json(input): Json<PaymentInput>,
) -> Result<Json<Due>, ClubError>
where
    G: PersistenceGateway + 'static,
{
    Ok(Json(service.record_payment(&due_id, input).await?))
}
