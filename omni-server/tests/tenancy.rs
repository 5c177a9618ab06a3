//! Host-based tenant resolution and partition isolation

mod common;

use common::{ADMIN_EMAIL, TestApp, TestRequest, cart};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn unknown_host_is_not_found() {
    let app = TestApp::new();
    app.tenant("Burger Joint", "burger.test").await;

    let (status, err) = app.get("nowhere.test", "/api/v1/store/menu").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], "not_found");
    assert_eq!(err["details"]["host"], "nowhere.test");
}

#[tokio::test]
async fn host_matching_ignores_case_and_port() {
    let app = TestApp::new();
    app.tenant("Burger Joint", "burger.test").await;

    let (status, config) = app.get("Burger.TEST:8443", "/api/v1/store/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["name"], "Burger Joint");
}

#[tokio::test]
async fn orders_never_cross_tenants() {
    let app = TestApp::new();
    let burgers = app.tenant("Burger Joint", "burger.test").await;
    let tacos = app.tenant("Taco Stand", "tacos.test").await;
    let burger = app.item(&burgers, "OmniBurger").await;
    let shake = app.item(&tacos, "Vanilla Shake").await;

    let (_, created) = app.place_order("burger.test", cart(&[(&burger, 1)])).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Same id, other tenant
    let (status, _) = app
        .get("tacos.test", &format!("/api/v1/store/orders/{id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            TestRequest::new(
                Method::PUT,
                "tacos.test",
                &format!("/api/v1/kitchen/orders/{id}/status"),
            )
            .token(&app.staff_token(&tacos))
            .json(json!({ "status": "READY" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A burger item is not on the taco menu
    let (status, _) = app.place_order("tacos.test", cart(&[(&burger, 1)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Ticket numbering is per tenant
    let (status, created) = app.place_order("tacos.test", cart(&[(&shake, 1)])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["ticketNumber"], 1);

    let (_, active) = app
        .send(
            TestRequest::new(Method::GET, "tacos.test", "/api/v1/kitchen/orders")
                .token(&app.staff_token(&tacos)),
        )
        .await;
    assert_eq!(active.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_tokens_are_rejected_before_resolution() {
    let app = TestApp::new();
    app.tenant("Burger Joint", "burger.test").await;

    let (status, err) = app
        .send(TestRequest::new(Method::GET, "burger.test", "/api/v1/store/menu").token("garbage"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["kind"], "unauthorized");
}

#[tokio::test]
async fn admin_host_is_allow_listed() {
    let app = TestApp::new();

    let (status, _) = app.get("admin.omni.test", "/api/v1/store/menu").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, err) = app
        .send(
            TestRequest::new(Method::GET, "admin.omni.test", "/api/v1/store/menu")
                .token(&app.sso_token("mallory@omni.test", &[])),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["kind"], "forbidden");

    // The shared namespace has no menu
    let (status, _) = app
        .send(
            TestRequest::new(Method::GET, "admin.omni.test", "/api/v1/store/menu")
                .token(&app.sso_token(ADMIN_EMAIL, &[])),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
