use async_trait::async_trait;
use chrono::NaiveDate;
use clube_admin::access::{PersonKind, Venue};
use clube_admin::config::AppConfig;
use clube_admin::error::AppError;
use clube_admin::gateway::{
    GatewayError, InMemoryGateway, PersistenceGateway, PostgrestGateway, Predicate, Query, Row,
    Table,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: &'static str,
}

/// Store selected at startup: the hosted database, or seeded in-process tables
/// when no credentials are configured outside production.
#[derive(Clone)]
pub(crate) enum ClubGateway {
    Hosted(PostgrestGateway),
    Local(InMemoryGateway),
}

impl ClubGateway {
    pub(crate) fn connect(config: &AppConfig) -> Result<Self, AppError> {
        match &config.store {
            Some(store) => {
                info!(url = %store.url, "using hosted club database");
                Ok(Self::Hosted(PostgrestGateway::new(store)?))
            }
            None => {
                warn!("no store credentials configured; serving seeded in-memory data");
                Ok(Self::Local(crate::demo::seeded_gateway()?))
            }
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            ClubGateway::Hosted(_) => "postgrest",
            ClubGateway::Local(_) => "in-memory",
        }
    }
}

#[async_trait]
impl PersistenceGateway for ClubGateway {
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError> {
        match self {
            ClubGateway::Hosted(gateway) => gateway.find_one(table, predicate).await,
            ClubGateway::Local(gateway) => gateway.find_one(table, predicate).await,
        }
    }

    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError> {
        match self {
            ClubGateway::Hosted(gateway) => gateway.find_many(table, query).await,
            ClubGateway::Local(gateway) => gateway.find_many(table, query).await,
        }
    }

    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError> {
        match self {
            ClubGateway::Hosted(gateway) => gateway.count(table, predicate).await,
            ClubGateway::Local(gateway) => gateway.count(table, predicate).await,
        }
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, GatewayError> {
        match self {
            ClubGateway::Hosted(gateway) => gateway.insert(table, row).await,
            ClubGateway::Local(gateway) => gateway.insert(table, row).await,
        }
    }

    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        match self {
            ClubGateway::Hosted(gateway) => gateway.update(table, predicate, patch).await,
            ClubGateway::Local(gateway) => gateway.update(table, predicate, patch).await,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_kind(raw: &str) -> Result<PersonKind, String> {
    raw.parse::<PersonKind>().map_err(|err| err.to_string())
}

pub(crate) fn parse_venue(raw: &str) -> Result<Venue, String> {
    if raw.trim().is_empty() {
        return Err("venue must not be empty".to_string());
    }
    Ok(Venue::parse(raw))
}
