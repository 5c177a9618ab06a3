//! Storefront → kitchen order flow over the HTTP surface

mod common;

use std::time::Duration;

use common::{TestApp, TestRequest, cart, test_config};
use http::{Method, StatusCode};
use omni_server::Config;
use serde_json::json;
use uuid::Uuid;

const HOST: &str = "burger.test";

#[tokio::test]
async fn storefront_serves_config_and_menu() {
    let app = TestApp::new();
    app.tenant("Burger Joint", HOST).await;

    let (status, config) = app.get(HOST, "/api/v1/store/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["name"], "Burger Joint");
    assert_eq!(config["primary_color"], "#000000");
    assert_eq!(config["preset"], "mono-luxe");

    let (status, menu) = app.get(HOST, "/api/v1/store/menu").await;
    assert_eq!(status, StatusCode::OK);
    let sections: Vec<&str> = menu
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(sections, ["Burgers", "Sides", "Drinks"]);
}

#[tokio::test]
async fn order_moves_through_the_kitchen() {
    let app = TestApp::new();
    let partition = app.tenant("Burger Joint", HOST).await;
    let burger = app.item(&partition, "OmniBurger").await;
    let staff = app.staff_token(&partition);

    // Unknown line is dropped; total recomputed from the catalog
    let mut body = cart(&[(&burger, 2)]);
    body["items"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": Uuid::new_v4(), "qty": 1 }));
    let (status, created) = app.place_order(HOST, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["ticketNumber"], 1);
    assert_eq!(created["totalAmount"], 2800);
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["message"], "Order received");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, view) = app.get(HOST, &format!("/api/v1/store/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "PENDING");
    assert_eq!(view["items"].as_array().unwrap().len(), 1);

    let set_status = |status: &str| {
        TestRequest::new(Method::PUT, HOST, &format!("/api/v1/kitchen/orders/{id}/status"))
            .token(&staff)
            .json(json!({ "status": status }))
    };

    let (status, updated) = app.send(set_status("PREPARING")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "PREPARING");

    let (status, active) = app
        .send(TestRequest::new(Method::GET, HOST, "/api/v1/kitchen/orders").token(&staff))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active.as_array().unwrap().len(), 1);

    // Backward move
    let (status, err) = app.send(set_status("QUEUED")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "conflict");

    let (status, _) = app.send(set_status("COMPLETED")).await;
    assert_eq!(status, StatusCode::OK);

    // Terminal
    let (status, _) = app.send(set_status("READY")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, view) = app.get(HOST, &format!("/api/v1/store/orders/{id}")).await;
    assert_eq!(view["status"], "COMPLETED");

    let (_, active) = app
        .send(TestRequest::new(Method::GET, HOST, "/api/v1/kitchen/orders").token(&staff))
        .await;
    assert!(active.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tickets_count_up_per_day() {
    let app = TestApp::new();
    let partition = app.tenant("Burger Joint", HOST).await;
    let fries = app.item(&partition, "Truffle Fries").await;

    for expected in 1..=3 {
        let (status, created) = app.place_order(HOST, cart(&[(&fries, 1)])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["ticketNumber"], expected);
    }
}

#[tokio::test]
async fn kitchen_needs_staff_identity() {
    let app = TestApp::new();
    let partition = app.tenant("Burger Joint", HOST).await;
    let other = app.tenant("Taco Stand", "tacos.test").await;

    let (status, err) = app.get(HOST, "/api/v1/kitchen/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["kind"], "unauthorized");

    let (status, err) = app
        .send(
            TestRequest::new(Method::GET, HOST, "/api/v1/kitchen/orders")
                .token(&app.staff_token(&other)),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["kind"], "forbidden");

    let (status, _) = app
        .send(
            TestRequest::new(Method::GET, HOST, "/api/v1/kitchen/orders")
                .token(&app.staff_token(&partition)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_carts_are_rejected() {
    let app = TestApp::new();
    let partition = app.tenant("Burger Joint", HOST).await;
    let burger = app.item(&partition, "OmniBurger").await;

    let (status, err) = app
        .place_order(HOST, json!({ "customerName": "Ada", "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "bad_request");

    let (status, _) = app.place_order(HOST, cart(&[(&burger, 0)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .place_order(
            HOST,
            json!({
                "customerName": "Ada",
                "strict": true,
                "items": [{ "id": burger.id, "qty": 1 }, { "id": Uuid::new_v4(), "qty": 1 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut blank_name = cart(&[(&burger, 1)]);
    blank_name["customerName"] = json!("   ");
    let (status, _) = app.place_order(HOST, blank_name).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_or_malformed_order_ids_are_not_found() {
    let app = TestApp::new();
    app.tenant("Burger Joint", HOST).await;

    let (status, err) = app.get(HOST, "/api/v1/store/orders/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], "not_found");

    let (status, _) = app
        .get(HOST, &format!("/api/v1/store/orders/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_placement_is_rate_limited_per_client() {
    let app = TestApp::with_config(Config {
        order_rate_limit: 3,
        ..test_config()
    });
    let partition = app.tenant("Burger Joint", HOST).await;
    let fries = app.item(&partition, "Truffle Fries").await;

    let order_from = |ip: &str| {
        TestRequest::new(Method::POST, HOST, "/api/v1/store/orders")
            .client_ip(ip)
            .json(cart(&[(&fries, 1)]))
    };

    for _ in 0..3 {
        let (status, _) = app.send(order_from("203.0.113.7")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, err) = app.send(order_from("203.0.113.7")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(err["kind"], "too_many_requests");

    let (status, _) = app.send(order_from("198.51.100.2")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn new_orders_reach_kitchen_subscribers() {
    let app = TestApp::new();
    let partition = app.tenant("Burger Joint", HOST).await;
    let shake = app.item(&partition, "Vanilla Shake").await;
    let mut subscription = app.state.hub.subscribe(&partition);

    let (status, created) = app.place_order(HOST, cart(&[(&shake, 1)])).await;
    assert_eq!(status, StatusCode::OK);

    let event = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.name(), "new_order");
    let payload = serde_json::to_value(event.as_ref()).unwrap();
    assert_eq!(payload["order"]["id"], created["id"]);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("anything.test", "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
