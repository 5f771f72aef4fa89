use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::directory::router::listings_handler;
use crate::directory::DirectoryService;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("valid request")
}

#[tokio::test]
async fn criteria_route_lists_catalog_by_category() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/criteria")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let groups = payload.as_array().expect("array of groups");
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[0]["category"], "legacy_arc_support");
    assert_eq!(groups[2]["options"].as_array().unwrap().len(), 3);
    assert_eq!(groups[2]["options"][2]["key"], "service_none");
    assert_eq!(groups[2]["options"][2]["points"], -50);
    assert_eq!(groups[3]["options"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn score_route_returns_grade_and_breakdown() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/score",
            json!({
                "legacy_arc": "legacy_arc_no_support",
                "new_arc": "new_arc_no_support",
                "service": "service_none",
                "registration": "registration_offline"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], -25);
    assert_eq!(payload["grade"], "F");
    assert_eq!(payload["breakdown"]["components"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn score_route_rejects_unknown_criterion() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/score",
            json!({
                "legacy_arc": "legacy_arc_full_support",
                "new_arc": "legacy_arc_full_support",
                "service": "service_full",
                "registration": "registration_online"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("new_arc_support"));
}

#[tokio::test]
async fn create_route_ignores_submitted_score() {
    let (service, _) = build_service();
    let category = seeded_category(&service);
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/providers",
            json!({
                "name": "EasyCard",
                "category": category.id.0,
                "url": "https://www.easycard.com.tw",
                "legacy_arc": "legacy_arc_full_support",
                "new_arc": "new_arc_separate_support",
                "service": "service_full",
                "registration": "registration_online",
                "score": 100
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], 90);
    assert_eq!(payload["grade"], "A");
    assert_eq!(payload["active"], true);
}

#[tokio::test]
async fn update_route_recomputes_score() {
    let (service, _) = build_service();
    let category = seeded_category(&service);
    let provider = service
        .create_provider(draft(&category.id, "Foodpanda"))
        .expect("provider created");
    let router = router_with_service(service);

    let mut edit = serde_json::to_value(provider.to_draft()).expect("draft serializes");
    edit["service"] = json!("service_none");

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/providers/{}", provider.id()),
            edit,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], 50);
    assert_eq!(payload["grade"], "E");
}

#[tokio::test]
async fn provider_route_returns_not_found() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/providers/prov-nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_category_route_conflicts_while_in_use() {
    let (service, _) = build_service();
    let category = seeded_category(&service);
    service
        .create_provider(draft(&category.id, "Taipower"))
        .expect("provider created");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::delete(format!("/api/v1/categories/{}", category.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn category_routes_create_and_delete() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/categories",
            json!({ "name": "Banks & Finance" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["slug"], "banks-finance");
    let id = payload["id"].as_str().expect("id").to_string();

    let response = router
        .oneshot(
            Request::delete(format!("/api/v1/categories/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn category_route_rejects_blank_name() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/categories",
            json!({ "name": "  " }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "category name must not be empty");
}

#[tokio::test]
async fn listings_handler_reports_repository_failures() {
    let service = Arc::new(DirectoryService::new(Arc::new(UnavailableRepository)));

    let response = listings_handler::<UnavailableRepository>(State(service)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
