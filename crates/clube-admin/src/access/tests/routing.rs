use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::access::router::{evaluate_handler, EvaluateRequest};
use crate::access::{AccessService, PersonKind, Venue};

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn evaluate_route_returns_denials_as_ok() {
    let (service, _) = build_service();
    let router = access_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/access/evaluate",
            json!({ "person_id": "m-edu", "person_kind": "associado", "venue": "academia" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["admitted"], json!(false));
    assert_eq!(payload["reason"], json!("delinquent"));
    assert_eq!(payload["denial"]["code"], json!("delinquent"));
    assert_eq!(payload["subject"]["kind"], json!("member"));
}

#[tokio::test]
async fn evaluate_handler_maps_missing_person_to_not_found() {
    let (service, _) = build_service();

    let response = evaluate_handler::<crate::gateway::InMemoryGateway>(
        State(Arc::new(service)),
        Json(EvaluateRequest {
            person_id: "m-ghost".to_string(),
            person_kind: PersonKind::Member,
            venue: Venue::Club,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], json!("not_found"));
}

#[tokio::test]
async fn evaluate_route_reports_store_outage_as_bad_gateway() {
    let router = crate::access::access_router(Arc::new(AccessService::new(Arc::new(
        UnavailableGateway,
    ))));

    let response = router
        .oneshot(post_json(
            "/api/v1/access/evaluate",
            json!({ "person_id": "m-ana", "person_kind": "member" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], json!("data_access"));
}

#[tokio::test]
async fn unknown_person_kind_is_rejected_before_evaluation() {
    let (service, _) = build_service();
    let router = access_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/access/evaluate",
            json!({ "person_id": "m-ana", "person_kind": "staff", "venue": "club" }),
        ))
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn passage_route_creates_records() {
    let (service, gateway) = build_service();
    let router = access_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/access/passages",
            json!({
                "person_id": "m-ana",
                "person_kind": "member",
                "direction": "entrada",
                "venue": "piscina"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["ponto_acesso_id"], json!("p-piscina"));
    assert_eq!(
        gateway
            .rows(crate::gateway::Table::AccessRecords)
            .expect("rows")
            .len(),
        1
    );
}

#[tokio::test]
async fn passage_route_reports_missing_point_as_unavailable() {
    let (service, _) = build_service();
    let router = access_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/access/passages",
            json!({
                "person_id": "m-ana",
                "person_kind": "member",
                "direction": "in",
                "venue": "gym"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn records_route_accepts_query_filters() {
    let (service, gateway) = build_service();
    gateway
        .seed(
            crate::gateway::Table::AccessRecords,
            row(json!({
                "id": "r-1",
                "ponto_acesso_id": "p-portaria",
                "associado_id": "m-ana",
                "tipo": "saida",
                "created_at": "2026-10-19T18:00:00Z",
            })),
        )
        .expect("seed record");
    let router = access_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/access/records?venue=club&direction=out&limit=5")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["tipo"], json!("saida"));
}

#[tokio::test]
async fn stats_route_returns_counters() {
    let (service, _) = build_service();
    let router = access_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/access/stats")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["entries"], json!(0));
    assert_eq!(payload["estimated_present"], json!(0));
}
