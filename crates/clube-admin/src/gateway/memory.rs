use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{Condition, GatewayError, PersistenceGateway, Predicate, Query, Row, Table};

/// In-process tables backing tests, the demo command and store-less development runs.
///
/// Rows keep insertion order, which stands in for the store's natural order.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    tables: Arc<Mutex<HashMap<Table, Vec<Row>>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a row verbatim, bypassing id and timestamp assignment.
    pub fn seed(&self, table: Table, row: Row) -> Result<(), GatewayError> {
        self.lock()?.entry(table).or_default().push(row);
        Ok(())
    }

    pub fn rows(&self, table: Table) -> Result<Vec<Row>, GatewayError> {
        Ok(self.lock()?.get(&table).cloned().unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Table, Vec<Row>>>, GatewayError> {
        self.tables
            .lock()
            .map_err(|_| GatewayError::data_access("in-memory store lock poisoned"))
    }

    fn next_id(&self, table: Table) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{id:06}", table.name())
    }

    fn select(&self, table: Table, predicate: &Predicate) -> Result<Vec<Row>, GatewayError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_predicate(row, predicate))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError> {
        self.select(table, predicate)?
            .into_iter()
            .next()
            .ok_or(GatewayError::NotFound {
                table: table.name(),
            })
    }

    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let mut rows = self.select(table, &query.predicate)?;
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_for_sort(a.get(&order.field), b.get(&order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError> {
        Ok(self.select(table, predicate)?.len() as u64)
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, GatewayError> {
        if !row.contains_key("id") {
            row.insert("id".to_string(), Value::String(self.next_id(table)));
        }
        if !row.contains_key("created_at") {
            row.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.lock()?.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        let mut guard = self.lock()?;
        let mut updated = Vec::new();
        if let Some(rows) = guard.get_mut(&table) {
            for row in rows.iter_mut().filter(|row| matches_predicate(row, predicate)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }
}

fn matches_predicate(row: &Row, predicate: &Predicate) -> bool {
    predicate
        .conditions()
        .iter()
        .all(|condition| matches_condition(row, condition))
}

fn matches_condition(row: &Row, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(field, expected) => row
            .get(field)
            .map(|actual| compare_values(actual, expected) == Some(CmpOrdering::Equal))
            .unwrap_or(false),
        Condition::Gte(field, bound) => in_range(row, field, bound, |o| o != CmpOrdering::Less),
        Condition::Lte(field, bound) => in_range(row, field, bound, |o| o != CmpOrdering::Greater),
        Condition::Lt(field, bound) => in_range(row, field, bound, |o| o == CmpOrdering::Less),
        Condition::Contains(field, needle) => match row.get(field) {
            Some(Value::String(text)) => text.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        Condition::IsNull(field) => matches!(row.get(field), None | Some(Value::Null)),
        Condition::AnyOf(terms) => terms.iter().any(|term| matches_condition(row, term)),
    }
}

fn in_range(row: &Row, field: &str, bound: &Value, accept: impl Fn(CmpOrdering) -> bool) -> bool {
    row.get(field)
        .and_then(|actual| compare_values(actual, bound))
        .map(accept)
        .unwrap_or(false)
}

/// Numbers compare numerically, strings lexicographically (ISO dates and
/// timestamps order correctly), booleans by value. Mixed types do not compare.
fn compare_values(left: &Value, right: &Value) -> Option<CmpOrdering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

// nulls sort last in both directions, as PostgREST does for ascending order
fn compare_for_sort(left: Option<&Value>, right: Option<&Value>) -> CmpOrdering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (Some(l), Some(r)) => compare_values(l, r).unwrap_or(CmpOrdering::Equal),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Order;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    fn exams() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        for (id, expiry, result) in [
            ("e-1", "2026-01-10", "apto"),
            ("e-2", "2026-06-30", "apto"),
            ("e-3", "2026-03-01", "inapto"),
        ] {
            gateway
                .seed(
                    Table::MedicalExams,
                    row(json!({ "id": id, "associado_id": "m-1", "data_validade": expiry, "resultado": result })),
                )
                .expect("seed");
        }
        gateway
    }

    #[tokio::test]
    async fn find_many_filters_orders_and_limits() {
        let gateway = exams();
        let query = Query::from(
            Predicate::new()
                .eq("associado_id", "m-1")
                .eq("resultado", "apto")
                .gte("data_validade", "2026-01-10"),
        )
        .order_by(Order::desc("data_validade"))
        .limit(1);

        let rows = gateway
            .find_many(Table::MedicalExams, &query)
            .await
            .expect("query runs");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!("e-2"));
    }

    #[tokio::test]
    async fn find_one_reports_not_found() {
        let gateway = exams();
        match gateway
            .find_one(Table::MedicalExams, &Predicate::new().eq("id", "missing"))
            .await
        {
            Err(GatewayError::NotFound { table }) => assert_eq!(table, "exames_medicos"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let gateway = InMemoryGateway::new();
        let stored = gateway
            .insert(Table::AccessRecords, row(json!({ "tipo": "entrada" })))
            .await
            .expect("insert");
        assert!(stored["id"]
            .as_str()
            .expect("id string")
            .starts_with("registros_acesso-"));
        assert!(stored.contains_key("created_at"));
        assert_eq!(gateway.rows(Table::AccessRecords).expect("rows").len(), 1);
    }

    #[tokio::test]
    async fn update_patches_matching_rows_only() {
        let gateway = exams();
        let updated = gateway
            .update(
                Table::MedicalExams,
                &Predicate::new().eq("resultado", "inapto"),
                row(json!({ "resultado": "apto" })),
            )
            .await
            .expect("update");
        assert_eq!(updated.len(), 1);
        let fit = gateway
            .count(Table::MedicalExams, &Predicate::new().eq("resultado", "apto"))
            .await
            .expect("count");
        assert_eq!(fit, 3);
    }

    #[tokio::test]
    async fn disjunction_and_null_checks() {
        let gateway = InMemoryGateway::new();
        gateway
            .seed(Table::Ballots, row(json!({ "id": "v-1", "chapa_id": null })))
            .expect("seed");
        gateway
            .seed(Table::Ballots, row(json!({ "id": "v-2", "chapa_id": "c-1" })))
            .expect("seed");
        gateway
            .seed(Table::Members, row(json!({ "id": "m-1", "nome": "Ana Souza", "cpf": "12345678901" })))
            .expect("seed");

        let blanks = gateway
            .count(Table::Ballots, &Predicate::new().is_null("chapa_id"))
            .await
            .expect("count");
        assert_eq!(blanks, 1);

        let found = gateway
            .find_many(
                Table::Members,
                &Query::from(Predicate::new().any_of(vec![
                    Condition::contains("nome", "souza"),
                    Condition::contains("cpf", "999"),
                ])),
            )
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
    }
}
