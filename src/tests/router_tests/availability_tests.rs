// src/tests/router_tests/availability_tests.rs
//
// "Feature disabled" (no store configured) versus "feature broken" (configured, not connected).

use crate::db::{Store, StoreConfig};
use crate::router::respond;
use crate::tests::utils::{body_json, init_test_store, request, site_a, temp_db_path};
use http::Method;
use serde_json::json;

fn disconnected_store() -> Store {
    Store::new(StoreConfig::new(temp_db_path("disconnected")))
}

#[test]
fn list_without_a_configured_store_is_an_empty_success() {
    let store = Store::unconfigured();
    let resp = respond(request(Method::GET, "/api/field-data", None), &store);

    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp), json!([]));
}

#[test]
fn writes_without_a_configured_store_are_503() {
    let store = Store::unconfigured();

    let resp = respond(
        request(Method::POST, "/api/field-data", Some(&site_a())),
        &store,
    );
    assert_eq!(resp.status(), 503);
    assert_eq!(body_json(resp)["error"], "Database not available");

    // even an invalid payload: availability is checked first
    let resp = respond(
        request(
            Method::POST,
            "/api/field-data",
            Some(&json!({ "category": "invalid" })),
        ),
        &store,
    );
    assert_eq!(resp.status(), 503);
}

#[test]
fn list_on_a_configured_but_disconnected_store_is_503_not_empty() {
    let store = disconnected_store();
    let resp = respond(request(Method::GET, "/api/field-data", None), &store);

    assert_eq!(resp.status(), 503);
    assert_eq!(body_json(resp)["error"], "Database not connected");
}

#[test]
fn every_record_operation_is_503_while_disconnected() {
    let store = disconnected_store();
    let uri = "/api/field-data/65a1b2c3d4e5f60718293a4b";

    let cases = [
        request(Method::POST, "/api/field-data", Some(&site_a())),
        request(Method::GET, uri, None),
        request(Method::PUT, uri, Some(&site_a())),
        request(Method::DELETE, uri, None),
    ];
    for req in cases {
        let method = req.method().clone();
        let resp = respond(req, &store);
        assert_eq!(resp.status(), 503, "{method} should be unavailable");
    }
}

#[test]
fn disconnecting_at_runtime_turns_lists_into_503() {
    let store = init_test_store();
    respond(
        request(Method::POST, "/api/field-data", Some(&site_a())),
        &store,
    );

    store.disconnect();
    let resp = respond(request(Method::GET, "/api/field-data", None), &store);
    assert_eq!(resp.status(), 503);

    store.connect().unwrap();
    let resp = respond(request(Method::GET, "/api/field-data", None), &store);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp).as_array().unwrap().len(), 1);
}

#[test]
fn store_faults_become_a_generic_500() {
    let store = init_test_store();
    store
        .with_conn(|conn| {
            conn.execute(
                "insert into field_data (id, title, category, location, description, created_at) \
                 values ('corrupted', 't', 'water', 'l', 'd', 0)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    let resp = respond(request(Method::GET, "/api/field-data", None), &store);
    assert_eq!(resp.status(), 500);

    let body = body_json(resp);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[test]
fn health_reports_the_store_state() {
    let cases = [
        (Store::unconfigured(), "unconfigured"),
        (disconnected_store(), "disconnected"),
        (init_test_store(), "connected"),
    ];

    for (store, expected) in cases {
        let resp = respond(request(Method::GET, "/api/health", None), &store);
        assert_eq!(resp.status(), 200);
        assert_eq!(
            body_json(resp),
            json!({ "status": "ok", "store": expected })
        );
    }
}
