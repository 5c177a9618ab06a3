//! Sandbox sessions, sandbox reset and tenant provisioning

mod common;

use common::{ADMIN_EMAIL, TestApp, TestRequest, cart};
use http::{Method, StatusCode};
use serde_json::{Value, json};

const DEMO: &str = "demo.omni.test";
const ADMIN: &str = "admin.omni.test";

async fn demo_session(app: &TestApp) -> Value {
    let (status, session) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/sys/generate-demo-session").json(json!({
                "name": "Ada",
                "email": "Ada@Example.test",
                "businessName": "Ada's Diner",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    session
}

#[tokio::test]
async fn demo_session_opens_a_seeded_sandbox() {
    let app = TestApp::new();
    let session = demo_session(&app).await;
    let token = session["token"].as_str().unwrap();

    assert!(session["schemaName"].as_str().unwrap().starts_with("demo_"));
    assert_eq!(session["demoHost"], DEMO);
    assert_eq!(session["expiresIn"], 3600);

    let (status, config) = app
        .send(TestRequest::new(Method::GET, DEMO, "/api/v1/store/config").token(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["name"], "Ada's Diner");

    let (status, menu) = app
        .send(TestRequest::new(Method::GET, DEMO, "/api/v1/store/menu").token(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu[0]["name"], "Mains");

    // The sandbox owner runs its kitchen
    let (status, _) = app
        .send(TestRequest::new(Method::GET, DEMO, "/api/v1/kitchen/orders").token(token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sandboxes_are_isolated_from_each_other() {
    let app = TestApp::new();
    let first = demo_session(&app).await;
    let second = demo_session(&app).await;
    assert_ne!(first["schemaName"], second["schemaName"]);

    let item_id = |menu: &Value| menu[1]["items"][0]["id"].clone();
    let (_, menu) = app
        .send(
            TestRequest::new(Method::GET, DEMO, "/api/v1/store/menu")
                .token(first["token"].as_str().unwrap()),
        )
        .await;
    let (status, created) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/store/orders")
                .token(first["token"].as_str().unwrap())
                .json(json!({ "customerName": "Ada", "items": [{ "id": item_id(&menu), "qty": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            TestRequest::new(
                Method::GET,
                DEMO,
                &format!("/api/v1/store/orders/{}", created["id"].as_str().unwrap()),
            )
            .token(second["token"].as_str().unwrap()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demo_host_needs_a_sandbox_token() {
    let app = TestApp::new();
    let (status, err) = app.get(DEMO, "/api/v1/store/menu").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], "not_found");
}

#[tokio::test]
async fn reset_wipes_orders_and_reseeds() {
    let app = TestApp::new();
    let session = demo_session(&app).await;
    let token = session["token"].as_str().unwrap();

    let (_, menu) = app
        .send(TestRequest::new(Method::GET, DEMO, "/api/v1/store/menu").token(token))
        .await;
    let fries = menu[1]["items"][0]["id"].clone();
    let (_, created) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/store/orders")
                .token(token)
                .json(json!({ "customerName": "Ada", "items": [{ "id": fries, "qty": 2 }] })),
        )
        .await;
    assert_eq!(created["ticketNumber"], 1);

    let (status, reset) = app
        .send(TestRequest::new(Method::POST, DEMO, "/api/v1/sys/reset-demo").token(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["ordersRemoved"], 1);
    assert_eq!(reset["schemaName"], session["schemaName"]);

    let (status, _) = app
        .send(
            TestRequest::new(
                Method::GET,
                DEMO,
                &format!("/api/v1/store/orders/{}", created["id"].as_str().unwrap()),
            )
            .token(token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Catalog reseeded with fresh ids; ticket counter restarts
    let (_, menu) = app
        .send(TestRequest::new(Method::GET, DEMO, "/api/v1/store/menu").token(token))
        .await;
    assert_eq!(menu.as_array().unwrap().len(), 3);
    let fries = menu[1]["items"][0]["id"].clone();
    let (_, created) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/store/orders")
                .token(token)
                .json(json!({ "customerName": "Ada", "items": [{ "id": fries, "qty": 1 }] })),
        )
        .await;
    assert_eq!(created["ticketNumber"], 1);
}

#[tokio::test]
async fn reset_is_sandbox_only() {
    let app = TestApp::new();
    app.tenant("Burger Joint", "burger.test").await;

    let (status, err) = app
        .send(TestRequest::new(Method::POST, "burger.test", "/api/v1/sys/reset-demo"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["kind"], "forbidden");
}

#[tokio::test]
async fn demo_session_validates_input() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/sys/generate-demo-session")
                .json(json!({ "name": " ", "email": "ada@example.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/sys/generate-demo-session")
                .json(json!({ "name": "Ada", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provisioning_is_for_super_admins() {
    let app = TestApp::new();
    let request = |token: &str| {
        TestRequest::new(Method::POST, ADMIN, "/api/v1/sys/provision")
            .token(token)
            .json(json!({
                "name": "Noodle Bar",
                "domain": "Noodles.test",
                "primaryColor": "#aa3300",
            }))
    };

    let (status, _) = app
        .send(request(&app.sso_token("mallory@omni.test", &[])))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.sso_token(ADMIN_EMAIL, &[]);
    let (status, provisioned) = app.send(request(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provisioned["schemaName"], "tenant_noodlebar");

    let (status, config) = app.get("noodles.test", "/api/v1/store/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["name"], "Noodle Bar");
    assert_eq!(config["primary_color"], "#aa3300");

    let (status, menu) = app.get("noodles.test", "/api/v1/store/menu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu[0]["name"], "Burgers");

    let (status, err) = app.send(request(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "conflict");
    assert_eq!(err["code"], 3023);
    assert_eq!(err["details"]["domain"], "noodles.test");
}

#[tokio::test]
async fn provisioning_a_name_whose_partition_exists_is_a_partition_conflict() {
    let app = TestApp::new();
    let admin = app.sso_token(ADMIN_EMAIL, &[]);
    let provision = |name: &str, domain: &str| {
        TestRequest::new(Method::POST, ADMIN, "/api/v1/sys/provision")
            .token(&admin)
            .json(json!({ "name": name, "domain": domain }))
    };

    let (status, _) = app.send(provision("Burger Joint", "burger.test")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = app.send(provision("burger-joint", "other.test")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], 3024);
    assert_eq!(err["details"]["schemaName"], "tenant_burgerjoint");
    assert!(err["details"].get("domain").is_none());

    // The rejected domain stays unclaimed
    let (status, _) = app.get("other.test", "/api/v1/store/config").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demo_session_token_with_admin_email_is_not_an_admin() {
    let app = TestApp::new();
    let burger = app.tenant("Burger", "burger.test").await;
    let item = app.item(&burger, "OmniBurger").await;
    let (status, _) = app
        .place_order("burger.test", cart(&[(&item, 1)]))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, session) = app
        .send(
            TestRequest::new(Method::POST, DEMO, "/api/v1/sys/generate-demo-session")
                .json(json!({ "name": "Mallory", "email": ADMIN_EMAIL })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().unwrap();

    let (status, _) = app
        .send(TestRequest::new(Method::GET, "burger.test", "/api/v1/kitchen/orders").token(token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            TestRequest::new(Method::POST, ADMIN, "/api/v1/sys/provision")
                .token(token)
                .json(json!({ "name": "Evil", "domain": "evil.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("evil.test", "/api/v1/store/config").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
