//! Tenant binding, identity and role guards through the full router

mod common;

use common::{code, setup};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_needs_no_tenant() {
    let app = setup().await;
    let (status, body) = app.get("nowhere.invalid", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_host_is_rejected_before_auth() {
    let app = setup().await;

    let (status, body) = app.get("gamma.example.com", "/api/kitchen/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), 3002);

    let (status, _) = app.get("gamma.example.com", "/api/public/store", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ip_and_localhost_use_fallback_tenant() {
    let app = setup().await;
    for host in ["127.0.0.1:8080", "localhost", "ALPHA.example.com"] {
        let (status, body) = app.get(host, "/api/public/store", None).await;
        assert_eq!(status, StatusCode::OK, "host {host}");
        assert_eq!(body["data"]["subdomain"], "alpha");
    }

    let (status, body) = app.get(app.beta.host, "/api/public/store", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "beta restaurant");
    assert!(body["data"].get("id").is_none());
}

#[tokio::test]
async fn missing_or_bad_tokens_are_unauthenticated() {
    let app = setup().await;

    let (status, body) = app.get(app.alpha.host, "/api/kitchen/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1001);

    let (status, body) = app
        .get(app.alpha.host, "/api/kitchen/orders", Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1004);
}

#[tokio::test]
async fn token_of_another_tenant_is_forbidden() {
    let app = setup().await;

    let (status, body) = app
        .get(app.alpha.host, "/api/kitchen/orders", Some(&app.beta.kitchen))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 3003);

    let (status, _) = app
        .get(app.beta.host, "/api/admin/tables", Some(&app.alpha.admin))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn roles_are_enforced_per_route_group() {
    let app = setup().await;
    let host = app.alpha.host;

    let (status, body) = app.get(host, "/api/staff/tables", Some(&app.alpha.kitchen)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2002);

    let (status, body) = app.get(host, "/api/admin/tables", Some(&app.alpha.staff)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2003);

    let (status, _) = app.get(host, "/api/kitchen/orders", Some(&app.alpha.staff)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // admin passes every guard
    for uri in ["/api/kitchen/orders", "/api/staff/tables", "/api/admin/tables"] {
        let (status, _) = app.get(host, uri, Some(&app.alpha.admin)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn public_table_routes_are_token_only() {
    let app = setup().await;
    let host = app.alpha.host;

    let uri = format!("/api/public/tables/{}/info", app.alpha.table_token);
    let (status, body) = app.get(host, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Table 1");
    assert_eq!(body["data"]["status"], "EMPTY");
    assert!(body["data"].get("id").is_none());

    // a beta token means nothing on alpha's host
    let uri = format!("/api/public/tables/{}/info", app.beta.table_token);
    let (status, body) = app.get(host, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), 7001);

    // a raw table id is not a token
    let uri = format!("/api/public/tables/{}/orders", app.alpha.table_id);
    let (status, _) = app.get(host, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn call_staff_over_http() {
    let app = setup().await;
    let uri = format!("/api/public/tables/{}/call-staff", app.alpha.table_token);

    let (status, body) = app
        .post(app.alpha.host, &uri, None, json!({ "call_type": "PAYMENT" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["table_name"], "Table 1");
    assert_eq!(body["data"]["call_type"], "PAYMENT");

    let (status, _) = app
        .post(app.beta.host, &uri, None, json!({ "call_type": "SERVICE" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_tables() {
    let app = setup().await;
    let host = app.alpha.host;
    let admin = Some(app.alpha.admin.as_str());

    let (status, body) = app
        .post(host, "/api/admin/tables", admin, json!({ "name": "Patio", "capacity": 6 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let (status, body) = app
        .post(host, "/api/admin/tables", admin, json!({ "name": "Bar", "capacity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&body), 8);

    let (_, body) = app.get(host, "/api/admin/tables", admin).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Patio", "Table 1"]);

    // the new table is addressable by its token straight away
    let (status, _) = app
        .get(host, &format!("/api/public/tables/{token}/info"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // and invisible to beta
    let (_, body) = app.get(app.beta.host, "/api/admin/tables", Some(&app.beta.admin)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_edits_and_removes_tables() {
    let app = setup().await;
    let host = app.alpha.host;
    let admin = Some(app.alpha.admin.as_str());

    let (_, body) = app
        .post(host, "/api/admin/tables", admin, json!({ "name": "Spare", "capacity": 2 }))
        .await;
    let spare = body["data"]["id"].as_i64().unwrap();
    let spare_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::PUT,
            host,
            &format!("/api/admin/tables/{spare}"),
            admin,
            Some(json!({ "name": "Window", "capacity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Window");
    assert_eq!(body["data"]["access_token"], spare_token.as_str());

    // staff may not edit
    let (status, body) = app
        .send(
            Method::PUT,
            host,
            &format!("/api/admin/tables/{spare}"),
            Some(&app.alpha.staff),
            Some(json!({ "capacity": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2003);

    // beta cannot touch alpha's table
    let (status, body) = app
        .send(
            Method::DELETE,
            app.beta.host,
            &format!("/api/admin/tables/{spare}"),
            Some(&app.beta.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), 7001);

    // a table with order history stays
    app.place_alpha_order(json!([{ "menu_item_id": app.alpha.pho, "quantity": 1 }]))
        .await;
    let (status, body) = app
        .send(
            Method::DELETE,
            host,
            &format!("/api/admin/tables/{}", app.alpha.table_id),
            admin,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(code(&body), 7002);

    let (status, body) = app
        .send(Method::DELETE, host, &format!("/api/admin/tables/{spare}"), admin, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);
    let (status, _) = app
        .get(host, &format!("/api/public/tables/{spare_token}/info"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_settings_round_trip_through_admin() {
    let app = setup().await;
    let host = app.alpha.host;
    let admin = Some(app.alpha.admin.as_str());

    let (status, body) = app
        .send(
            Method::PUT,
            host,
            "/api/admin/store/settings",
            admin,
            Some(json!({ "bank_id": "970422", "account_no": "9999", "account_name": "ALPHA" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["qr_template"].is_null());

    let (status, body) = app
        .get(host, "/api/staff/store/settings", Some(&app.alpha.staff))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bank_id"], "970422");

    // patrons see the new account on the public store page
    let (_, body) = app.get(host, "/api/public/store", None).await;
    assert_eq!(body["data"]["account_no"], "9999");

    // kitchen has no access, and beta is untouched
    let (status, _) = app
        .get(host, "/api/admin/store/settings", Some(&app.alpha.kitchen))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, body) = app
        .get(app.beta.host, "/api/admin/store/settings", Some(&app.beta.admin))
        .await;
    assert_eq!(body["data"]["bank_id"], "970436");
}
