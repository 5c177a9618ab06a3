//! Test harness: full router over the in-memory backend

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use omni_server::auth::{JwksVerifier, MemoryCounterStore, SessionGrant};
use omni_server::db::{CatalogSeed, Repositories};
use omni_server::tenant::Partition;
use omni_server::{AppState, Config, api};
use serde_json::{Value, json};
use shared::models::{MenuItem, TenantCreate};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "root@omni.test";

const IDP_AUDIENCE: &str = "omni";
const IDP_KID: &str = "idp-1";
const IDP_SECRET: &[u8] = b"omni-idp-test-secret-0123456789abcde";
const IDP_SECRET_B64: &str = "b21uaS1pZHAtdGVzdC1zZWNyZXQtMDEyMzQ1Njc4OWFiY2Rl";

pub fn test_config() -> Config {
    Config {
        secret_key: "integration-secret".into(),
        demo_domain: "demo.omni.test".into(),
        admin_domain: "admin.omni.test".into(),
        super_admins: vec![ADMIN_EMAIL.into()],
        oidc_audience: Some(IDP_AUDIENCE.into()),
        oidc_algorithm: Algorithm::HS384,
        order_rate_limit: 1_000,
        ..Config::default()
    }
}

/// Identity-provider verifier with its key set already cached
fn idp_verifier(config: &Config) -> JwksVerifier {
    let keys: JwkSet = serde_json::from_value(json!({
        "keys": [{"kty": "oct", "kid": IDP_KID, "alg": "HS384", "k": IDP_SECRET_B64}]
    }))
    .unwrap();
    JwksVerifier::new(
        "http://127.0.0.1:9/jwks",
        config.oidc_audience.clone(),
        config.oidc_algorithm,
        config.jwks_cache_ttl(),
        Duration::from_millis(200),
    )
    .unwrap()
    .with_keys(keys)
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let jwks = Arc::new(idp_verifier(&config));
        let counters = MemoryCounterStore::new();
        let state = AppState::from_parts(
            config,
            Repositories::in_memory(),
            Arc::new(counters.clone()),
            Some(counters),
            Some(jwks),
        );
        let router = api::create_router(state.clone());
        Self { state, router }
    }

    /// Register a tenant under `domain` with the starter catalog
    pub async fn tenant(&self, name: &str, domain: &str) -> Partition {
        let partition = Partition::for_tenant_name(name).unwrap();
        let (_, partition) = self
            .state
            .directory
            .register(TenantCreate {
                name: name.into(),
                schema_name: partition.to_string(),
                domain: Some(domain.into()),
                is_sandbox: false,
                theme_config: json!({}),
            })
            .await
            .unwrap();
        self.state
            .repos
            .catalog
            .insert_seed(&partition, &CatalogSeed::starter())
            .await
            .unwrap();
        partition
    }

    pub async fn item(&self, partition: &Partition, name: &str) -> MenuItem {
        self.state
            .repos
            .catalog
            .list_items(partition, false)
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.name == name)
            .unwrap()
    }

    /// Session token granting kitchen access to `partition`
    pub fn staff_token(&self, partition: &Partition) -> String {
        self.state
            .tokens
            .issue(SessionGrant {
                subject: format!("staff:{partition}"),
                email: Some("chef@omni.test".into()),
                name: Some("Chef".into()),
                target_partition: Some(partition.to_string()),
            })
            .unwrap()
    }

    /// Identity-provider token, as an interactive sign-in would produce
    pub fn sso_token(&self, email: &str, groups: &[&str]) -> String {
        let mut header = Header::new(Algorithm::HS384);
        header.kid = Some(IDP_KID.into());
        let claims = json!({
            "sub": format!("idp|{email}"),
            "email": email,
            "groups": groups,
            "aud": IDP_AUDIENCE,
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(IDP_SECRET)).unwrap()
    }

    pub async fn send(&self, req: TestRequest) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(req.method)
            .uri(req.uri)
            .header(header::HOST, req.host);
        if let Some(token) = req.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(ip) = req.client_ip {
            builder = builder.header("x-forwarded-for", ip);
        }
        let body = match req.body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, host: &str, uri: &str) -> (StatusCode, Value) {
        self.send(TestRequest::new(Method::GET, host, uri)).await
    }

    pub async fn place_order(&self, host: &str, body: Value) -> (StatusCode, Value) {
        self.send(TestRequest::new(Method::POST, host, "/api/v1/store/orders").json(body))
            .await
    }
}

pub struct TestRequest {
    method: Method,
    host: String,
    uri: String,
    token: Option<String>,
    client_ip: Option<String>,
    body: Option<Value>,
}

impl TestRequest {
    pub fn new(method: Method, host: &str, uri: &str) -> Self {
        Self {
            method,
            host: host.into(),
            uri: uri.into(),
            token: None,
            client_ip: None,
            body: None,
        }
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn client_ip(mut self, ip: &str) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

pub fn cart(lines: &[(&MenuItem, i32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(item, qty)| json!({ "id": item.id, "qty": qty }))
        .collect();
    json!({ "customerName": "Ada", "tableNumber": "7", "items": items })
}
