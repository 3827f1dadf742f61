use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Days, FixedOffset, NaiveDate};
use serde_json::{json, Value};

use crate::access::{access_router, AccessService};
use crate::gateway::{
    GatewayError, InMemoryGateway, PersistenceGateway, Predicate, Query, Row, Table,
};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub(super) fn days_from_today(offset: i64) -> String {
    let date = if offset >= 0 {
        today().checked_add_days(Days::new(offset as u64))
    } else {
        today().checked_sub_days(Days::new(offset.unsigned_abs()))
    };
    date.expect("date in range").format("%Y-%m-%d").to_string()
}

pub(super) fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture rows must be objects, got {other}"),
    }
}

fn member(id: &str, name: &str, status: &str) -> Row {
    row(json!({ "id": id, "nome": name, "status": status, "plano": "individual" }))
}

fn dependent(id: &str, guardian: &str, name: &str, status: &str) -> Row {
    row(json!({ "id": id, "associado_id": guardian, "nome": name, "status": status }))
}

fn exam(id: &str, link_column: &str, person: &str, expiry_offset: i64, result: &str) -> Row {
    let mut exam = row(json!({
        "id": id,
        "data_validade": days_from_today(expiry_offset),
        "resultado": result,
    }));
    exam.insert(link_column.to_string(), json!(person));
    exam
}

fn overdue(id: &str, member: &str, reference: &str) -> Row {
    row(json!({
        "id": id,
        "associado_id": member,
        "referencia": reference,
        "valor": 180.0,
        "data_vencimento": format!("{reference}-10"),
        "status": "atrasado",
    }))
}

/// Seeds the standing fixtures every access test draws on.
///
/// Members: `m-ana` active with a fit exam for 30 more days, `m-bruno` active
/// with an exam expiring today, `m-carla` active with one that expired
/// yesterday, `m-davi` active with no exam, `m-edu` active but two dues
/// overdue, `m-fabi` suspended, `m-gil` inactive, `m-hugo` expelled.
pub(super) fn seed_club(gateway: &InMemoryGateway) {
    let members = [
        member("m-ana", "Ana Souza", "ativo"),
        member("m-bruno", "Bruno Lima", "ativo"),
        member("m-carla", "Carla Dias", "ativo"),
        member("m-davi", "Davi Rocha", "ativo"),
        member("m-edu", "Eduardo Melo", "ativo"),
        member("m-fabi", "Fabiana Reis", "suspenso"),
        member("m-gil", "Gilberto Prado", "inativo"),
        member("m-hugo", "Hugo Nunes", "expulso"),
    ];
    for record in members {
        gateway.seed(Table::Members, record).expect("seed member");
    }

    let dependents = [
        dependent("d-lia", "m-ana", "Lia Souza", "ativo"),
        dependent("d-leo", "m-ana", "Leo Souza", "ativo"),
        dependent("d-rui", "m-ana", "Rui Souza", "inativo"),
        dependent("d-tom", "m-fabi", "Tom Reis", "ativo"),
        dependent("d-ivo", "m-edu", "Ivo Melo", "ativo"),
        dependent("d-orfa", "m-sumiu", "Sem Titular", "ativo"),
    ];
    for record in dependents {
        gateway.seed(Table::Dependents, record).expect("seed dependent");
    }

    let exams = [
        exam("e-ana-old", "associado_id", "m-ana", -200, "apto"),
        exam("e-ana", "associado_id", "m-ana", 30, "apto"),
        exam("e-bruno", "associado_id", "m-bruno", 0, "apto"),
        exam("e-carla", "associado_id", "m-carla", -1, "apto"),
        exam("e-edu", "associado_id", "m-edu", 90, "apto"),
        exam("e-fabi", "associado_id", "m-fabi", 90, "apto"),
        exam("e-gil", "associado_id", "m-gil", 90, "apto"),
        exam("e-lia", "dependente_id", "d-lia", 10, "apto"),
        exam("e-tom", "dependente_id", "d-tom", 60, "apto"),
        exam("e-ivo", "dependente_id", "d-ivo", 60, "apto"),
        exam("e-davi-unfit", "associado_id", "m-davi", 60, "inapto"),
    ];
    for record in exams {
        gateway.seed(Table::MedicalExams, record).expect("seed exam");
    }

    for record in [overdue("f-1", "m-edu", "2026-08"), overdue("f-2", "m-edu", "2026-09")] {
        gateway.seed(Table::Dues, record).expect("seed due");
    }
    gateway
        .seed(
            Table::Dues,
            row(json!({
                "id": "f-3",
                "associado_id": "m-ana",
                "referencia": "2026-10",
                "valor": 180.0,
                "data_vencimento": "2026-10-10",
                "status": "pago",
            })),
        )
        .expect("seed due");

    let points = [
        row(json!({ "id": "p-portaria", "nome": "Portaria", "tipo": "clube", "ativo": true })),
        row(json!({ "id": "p-piscina-velha", "nome": "Catraca antiga", "tipo": "piscina", "ativo": false })),
        row(json!({ "id": "p-piscina", "nome": "Piscina", "tipo": "piscina", "ativo": true })),
    ];
    for record in points {
        gateway.seed(Table::AccessPoints, record).expect("seed access point");
    }
}

pub(super) fn club_gateway() -> Arc<InMemoryGateway> {
    let gateway = InMemoryGateway::new();
    seed_club(&gateway);
    Arc::new(gateway)
}

pub(super) fn build_service() -> (AccessService<InMemoryGateway>, Arc<InMemoryGateway>) {
    let gateway = club_gateway();
    let utc = FixedOffset::east_opt(0).expect("valid offset");
    (AccessService::new(gateway.clone()).with_utc_offset(utc), gateway)
}

pub(super) fn access_router_with_service(service: AccessService<InMemoryGateway>) -> axum::Router {
    access_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Gateway whose every call fails as if the store were unreachable.
pub(super) struct UnavailableGateway;

fn offline() -> GatewayError {
    GatewayError::data_access("connection refused")
}

#[async_trait]
impl PersistenceGateway for UnavailableGateway {
    async fn find_one(&self, _table: Table, _predicate: &Predicate) -> Result<Row, GatewayError> {
        Err(offline())
    }

    async fn find_many(&self, _table: Table, _query: &Query) -> Result<Vec<Row>, GatewayError> {
        Err(offline())
    }

    async fn count(&self, _table: Table, _predicate: &Predicate) -> Result<u64, GatewayError> {
        Err(offline())
    }

    async fn insert(&self, _table: Table, _row: Row) -> Result<Row, GatewayError> {
        Err(offline())
    }

    async fn update(
        &self,
        _table: Table,
        _predicate: &Predicate,
        _patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        Err(offline())
    }
}

/// Seeded store that fails only when a given table is touched.
pub(super) struct BrokenTableGateway {
    pub(super) inner: InMemoryGateway,
    pub(super) broken: Table,
}

impl BrokenTableGateway {
    pub(super) fn new(broken: Table) -> Self {
        let inner = InMemoryGateway::new();
        seed_club(&inner);
        Self { inner, broken }
    }

    fn guard(&self, table: Table) -> Result<(), GatewayError> {
        if table == self.broken {
            Err(offline())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PersistenceGateway for BrokenTableGateway {
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError> {
        self.guard(table)?;
        self.inner.find_one(table, predicate).await
    }

    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError> {
        self.guard(table)?;
        self.inner.find_many(table, query).await
    }

    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError> {
        self.guard(table)?;
        self.inner.count(table, predicate).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, GatewayError> {
        self.guard(table)?;
        self.inner.insert(table, row).await
    }

    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        self.guard(table)?;
        self.inner.update(table, predicate, patch).await
    }
}

/// Seeded store that remembers which tables were read.
#[derive(Default)]
pub(super) struct RecordingGateway {
    inner: InMemoryGateway,
    touched: Mutex<Vec<Table>>,
}

impl RecordingGateway {
    pub(super) fn seeded() -> Self {
        let gateway = Self::default();
        seed_club(&gateway.inner);
        gateway
    }

    pub(super) fn touched(&self) -> Vec<Table> {
        self.touched.lock().expect("recording mutex poisoned").clone()
    }

    fn note(&self, table: Table) {
        self.touched
            .lock()
            .expect("recording mutex poisoned")
            .push(table);
    }
}

#[async_trait]
impl PersistenceGateway for RecordingGateway {
    async fn find_one(&self, table: Table, predicate: &Predicate) -> Result<Row, GatewayError> {
        self.note(table);
        self.inner.find_one(table, predicate).await
    }

    async fn find_many(&self, table: Table, query: &Query) -> Result<Vec<Row>, GatewayError> {
        self.note(table);
        self.inner.find_many(table, query).await
    }

    async fn count(&self, table: Table, predicate: &Predicate) -> Result<u64, GatewayError> {
        self.note(table);
        self.inner.count(table, predicate).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, GatewayError> {
        self.note(table);
        self.inner.insert(table, row).await
    }

    async fn update(
        &self,
        table: Table,
        predicate: &Predicate,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        self.note(table);
        self.inner.update(table, predicate, patch).await
    }
}
