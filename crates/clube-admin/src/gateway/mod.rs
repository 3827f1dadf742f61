//! Capability interface over the club database.
//!
//! Services receive a gateway instance explicitly; there is no process-wide
//! client. Rows travel as JSON objects keyed by the store's column names and are
//! decoded into typed records at the service boundary.

mod memory;
mod postgrest;

pub use memory::InMemoryGateway;
pub use postgrest::PostgrestGateway;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single stored row.
pub type Row = serde_json::Map<String, Value>;

/// Tables the decision core reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Members,
    Dependents,
    Dues,
    MedicalExams,
    AccessPoints,
    AccessRecords,
    Elections,
    Slates,
    Candidates,
    Ballots,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Members => "associados",
            Table::Dependents => "dependentes",
            Table::Dues => "mensalidades",
            Table::MedicalExams => "exames_medicos",
            Table::AccessPoints => "pontos_acesso",
            Table::AccessRecords => "registros_acesso",
            Table::Elections => "eleicoes",
            Table::Slates => "chapas",
            Table::Candidates => "candidatos",
            Table::Ballots => "votos",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One filter term. `AnyOf` only accepts `Eq` and `Contains` terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Gte(String, Value),
    Lte(String, Value),
    Lt(String, Value),
    /// Case-insensitive substring match.
    Contains(String, String),
    IsNull(String),
    AnyOf(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Condition::Eq(field.to_string(), value.into())
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Condition::Contains(field.to_string(), needle.to_string())
    }

    fn disjunction_term(&self) -> bool {
        matches!(self, Condition::Eq(..) | Condition::Contains(..))
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::eq(field, value));
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Gte(field.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Lte(field.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Lt(field.to_string(), value.into()));
        self
    }

    pub fn contains(mut self, field: &str, needle: &str) -> Self {
        self.conditions.push(Condition::contains(field, needle));
        self
    }

    pub fn is_null(mut self, field: &str) -> Self {
        self.conditions.push(Condition::IsNull(field.to_string()));
        self
    }

    /// Adds a disjunction. Terms other than equality and substring are dropped.
    pub fn any_of(mut self, terms: Vec<Condition>) -> Self {
        let terms: Vec<Condition> = terms
            .into_iter()
            .filter(Condition::disjunction_term)
            .collect();
        if !terms.is_empty() {
            self.conditions.push(Condition::AnyOf(terms));
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

/// Predicate plus ordering and row limit for multi-row reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicate: Predicate,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn order_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl From<Predicate> for Query {
    fn from(predicate: Predicate) -> Self {
        Self {
            predicate,
            order: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("no matching row in {table}")]
    NotFound { table: &'static str },
    #[error("data access failed: {cause}")]
    DataAccess { cause: String },
}

impl GatewayError {
    pub fn data_access(cause: impl fmt::Display) -> Self {
        GatewayError::DataAccess {
            cause: cause.to_string(),
        }
    }
}

/// Store operations consumed by the decision services.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// First row matching the predicate, or `NotFound`.
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError>;
    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError>;
    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError>;
    async fn insert(&self, table: Table, row: Row) -> Result<Row, GatewayError>;
    /// Applies `patch` to every matching row and returns the updated rows.
    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError>;
}

/// Decodes a row into a typed record; malformed rows are data-access failures.
pub fn decode<T: DeserializeOwned>(table: Table, row: Row) -> Result<T, GatewayError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|err| GatewayError::data_access(format!("malformed row in {table}: {err}")))
}

pub fn decode_all<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter().map(|row| decode(table, row)).collect()
}

/// Encodes a typed record or patch; `None` fields are expected to be skipped by
/// the record's serde attributes.
pub fn encode<T: Serialize>(table: Table, value: &T) -> Result<Row, GatewayError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(GatewayError::data_access(format!(
            "cannot write non-object value to {table}: {other}"
        ))),
        Err(err) => Err(GatewayError::data_access(format!(
            "cannot encode row for {table}: {err}"
        ))),
    }
}
