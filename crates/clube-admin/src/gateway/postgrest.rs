use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Condition, GatewayError, PersistenceGateway, Predicate, Query, Row, Table};
use crate::config::StoreConfig;

/// Gateway speaking PostgREST query syntax against the club database.
#[derive(Clone)]
pub struct PostgrestGateway {
    client: Client,
    base_url: String,
}

impl PostgrestGateway {
    pub fn new(config: &StoreConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| GatewayError::data_access("service key is not a valid header value"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| GatewayError::data_access("service key is not a valid header value"))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| GatewayError::data_access(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table.name());
        debug!(%method, %table, "store request");
        self.client.request(method, url)
    }

    async fn send(&self, table: Table, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(|err| {
            warn!(%table, error = %err, "store request failed");
            GatewayError::data_access(format!("request to {table} failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%table, %status, "store rejected request");
            return Err(GatewayError::data_access(format!(
                "{table} returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn rows(&self, table: Table, request: RequestBuilder) -> Result<Vec<Row>, GatewayError> {
        self.send(table, request)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(|err| GatewayError::data_access(format!("invalid rows from {table}: {err}")))
    }
}

#[async_trait]
impl PersistenceGateway for PostgrestGateway {
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError> {
        let query = Query::from(predicate.clone()).limit(1);
        let request = self
            .request(Method::GET, table)
            .query(&query_params(&query));
        self.rows(table, request)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::NotFound {
                table: table.name(),
            })
    }

    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let request = self
            .request(Method::GET, table)
            .query(&query_params(query));
        self.rows(table, request).await
    }

    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError> {
        let request = self
            .request(Method::HEAD, table)
            .header("Prefer", "count=exact")
            .query(&query_params(&Query::from(predicate.clone())));
        let response = self.send(table, request).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        parse_content_range_total(range).ok_or_else(|| {
            GatewayError::data_access(format!("{table} returned no usable count ('{range}')"))
        })
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, GatewayError> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row);
        self.rows(table, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::data_access(format!("insert into {table} returned no row")))
    }

    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        let request = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&query_params(&Query::from(predicate.clone())))
            .json(&patch);
        self.rows(table, request).await
    }
}

/// Renders a query as PostgREST URL parameters.
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for condition in query.predicate.conditions() {
        params.push(condition_param(condition));
    }
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.field)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn condition_param(condition: &Condition) -> (String, String) {
    match condition {
        Condition::Eq(field, Value::Null) | Condition::IsNull(field) => {
            (field.clone(), "is.null".to_string())
        }
        Condition::Eq(field, value) => (field.clone(), format!("eq.{}", render(value))),
        Condition::Gte(field, value) => (field.clone(), format!("gte.{}", render(value))),
        Condition::Lte(field, value) => (field.clone(), format!("lte.{}", render(value))),
        Condition::Lt(field, value) => (field.clone(), format!("lt.{}", render(value))),
        Condition::Contains(field, needle) => (field.clone(), format!("ilike.*{needle}*")),
        Condition::AnyOf(terms) => {
            let rendered: Vec<String> = terms.iter().filter_map(disjunction_term).collect();
            ("or".to_string(), format!("({})", rendered.join(",")))
        }
    }
}

fn disjunction_term(term: &Condition) -> Option<String> {
    match term {
        Condition::Eq(field, value) => Some(format!("{field}.eq.{}", quote(&render(value)))),
        Condition::Contains(field, needle) => {
            Some(format!("{field}.ilike.{}", quote(&format!("*{needle}*"))))
        }
        _ => None,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// values inside or=(...) must be quoted when they contain reserved characters
fn quote(value: &str) -> String {
    if value.contains(&[',', '(', ')', ':', '"'][..]) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Extracts the total from `Content-Range` values such as `0-24/3573` or `*/0`.
pub(crate) fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}
