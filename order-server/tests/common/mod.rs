//! Shared fixtures: two tenants on one in-memory store, driven through the
//! full router with `oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use order_server::AppState;
use order_server::auth::{Role, create_token};
use order_server::db::MemoryStore;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{DiningTable, MenuItem, Tenant, TenantId};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// One seeded tenant
pub struct Fixture {
    pub tenant_id: TenantId,
    pub host: &'static str,
    pub table_id: i64,
    pub table_token: String,
    pub pho: i64,
    pub tea: i64,
    pub sold_out: i64,
    pub admin: String,
    pub staff: String,
    pub kitchen: String,
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub alpha: Fixture,
    pub beta: Fixture,
}

fn token(tenant: TenantId, role: Role) -> String {
    create_token("tester", tenant, role, chrono::Duration::hours(1), SECRET).unwrap()
}

fn menu_item(id: i64, tenant: TenantId, name: &str, price: i64, out_of_stock: bool) -> MenuItem {
    MenuItem {
        id,
        tenant_id: tenant,
        category_id: 1,
        name: name.into(),
        price: Decimal::from(price),
        out_of_stock,
        is_deleted: false,
    }
}

async fn seed(state: &AppState, id: i64, subdomain: &str, host: &'static str) -> Fixture {
    let tenant_id = TenantId(id);
    let store = &state.store;
    store
        .insert_tenant(&Tenant {
            id: tenant_id,
            subdomain: subdomain.into(),
            name: format!("{subdomain} restaurant"),
            bank_id: Some("970436".into()),
            account_no: Some("0011".into()),
            account_name: Some(subdomain.to_uppercase()),
            qr_template: None,
        })
        .await
        .unwrap();

    let table = DiningTable {
        id: id * 100 + 1,
        tenant_id,
        name: "Table 1".into(),
        capacity: 4,
        access_token: format!("{subdomain}-table-token"),
    };
    store.insert_table(&table).await.unwrap();

    let (pho, tea, sold_out) = (id * 1000 + 1, id * 1000 + 2, id * 1000 + 3);
    store
        .upsert_menu_item(&menu_item(pho, tenant_id, "Pho bo", 50000, false))
        .await
        .unwrap();
    store
        .upsert_menu_item(&menu_item(tea, tenant_id, "Iced tea", 20000, false))
        .await
        .unwrap();
    store
        .upsert_menu_item(&menu_item(sold_out, tenant_id, "Banh xeo", 60000, true))
        .await
        .unwrap();

    Fixture {
        tenant_id,
        host,
        table_id: table.id,
        table_token: table.access_token,
        pho,
        tea,
        sold_out,
        admin: token(tenant_id, Role::Admin),
        staff: token(tenant_id, Role::Staff),
        kitchen: token(tenant_id, Role::Kitchen),
    }
}

/// Tenants `alpha` (also the fallback) and `beta`
pub async fn setup() -> TestApp {
    let state = AppState::build(Arc::new(MemoryStore::new()), SECRET, "alpha");
    let alpha = seed(&state, 1, "alpha", "alpha.example.com").await;
    let beta = seed(&state, 2, "beta", "beta.example.com:8080").await;
    TestApp {
        router: order_server::api::router(state.clone()),
        state,
        alpha,
        beta,
    }
}

impl TestApp {
    /// Send one request; returns status and parsed JSON body (Null if empty)
    pub async fn send(
        &self,
        method: Method,
        host: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::HOST, host);
        if let Some(token) = bearer {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, host: &str, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, host, uri, bearer, None).await
    }

    pub async fn post(
        &self,
        host: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(Method::POST, host, uri, bearer, Some(body)).await
    }

    /// Place an order on alpha's table; returns the order snapshot
    pub async fn place_alpha_order(&self, items: Value) -> Value {
        let (status, body) = self
            .post(
                self.alpha.host,
                "/api/public/orders",
                None,
                serde_json::json!({ "access_token": self.alpha.table_token, "items": items }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "place order failed: {body}");
        body["data"].clone()
    }
}

/// Error code of an `ApiResponse` body
pub fn code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or(u64::MAX)
}

pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64().map(|f| Decimal::try_from(f).unwrap()))
        .unwrap()
}
