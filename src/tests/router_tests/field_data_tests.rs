// src/tests/router_tests/field_data_tests.rs

use crate::db::Store;
use crate::router::respond;
use crate::tests::utils::{body_json, count_field_data, init_test_store, request, site_a};
use http::Method;
use serde_json::{json, Value};

fn create(store: &Store, payload: &Value) -> (u16, Value) {
    let resp = respond(request(Method::POST, "/api/field-data", Some(payload)), store);
    (resp.status().as_u16(), body_json(resp))
}

fn list(store: &Store) -> Vec<Value> {
    let resp = respond(request(Method::GET, "/api/field-data", None), store);
    assert_eq!(resp.status(), 200);
    body_json(resp).as_array().cloned().unwrap()
}

fn count(store: &Store) -> i64 {
    store.with_conn(|conn| Ok(count_field_data(conn))).unwrap()
}

#[test]
fn create_then_read_one_returns_input_plus_id_and_timestamp() {
    let store = init_test_store();
    let payload = json!({
        "title": "Clinic Intake",
        "category": "health",
        "location": "Health Clinic - North",
        "latitude": 9.082,
        "longitude": 8.6753,
        "description": "42 patients screened",
        "user_id": "user-17",
        "time_taken": 35
    });

    let (status, created) = create(&store, &payload);
    assert_eq!(status, 201);

    let id = created["id"].as_str().expect("id assigned");
    assert_eq!(id.len(), 24);
    assert!(created["created_at"].is_string());

    let resp = respond(
        request(Method::GET, &format!("/api/field-data/{id}"), None),
        &store,
    );
    assert_eq!(resp.status(), 200);
    let fetched = body_json(resp);
    assert_eq!(fetched, created);

    for key in [
        "title",
        "category",
        "location",
        "latitude",
        "longitude",
        "description",
        "user_id",
    ] {
        assert_eq!(fetched[key], payload[key], "field {key} differs");
    }
    assert_eq!(fetched["time_taken"].as_f64(), Some(35.0));
}

#[test]
fn padded_strings_round_trip_unchanged() {
    let store = init_test_store();
    let mut payload = site_a();
    payload["title"] = json!("  Site A Sample ");
    payload["description"] = json!(" ");

    let (status, created) = create(&store, &payload);
    assert_eq!(status, 201);
    assert_eq!(created["title"], payload["title"]);

    let resp = respond(
        request(
            Method::GET,
            &format!("/api/field-data/{}", created["id"].as_str().unwrap()),
            None,
        ),
        &store,
    );
    let fetched = body_json(resp);
    assert_eq!(fetched["title"], "  Site A Sample ");
    assert_eq!(fetched["description"], " ");
}

#[test]
fn new_record_is_listed_first() {
    let store = init_test_store();
    create(
        &store,
        &json!({
            "title": "Older entry",
            "category": "climate",
            "location": "Coastal station",
            "description": "rainfall 12mm",
            "created_at": "2025-01-01T00:00:00Z"
        }),
    );

    let (status, created) = create(&store, &site_a());
    assert_eq!(status, 201);

    let records = list(&store);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], created["id"]);
    assert_eq!(records[0]["title"], "Site A Sample");
    assert_eq!(records[1]["title"], "Older entry");
}

#[test]
fn invalid_category_is_rejected_without_persisting() {
    let store = init_test_store();
    create(&store, &site_a());
    let before = list(&store).len();

    let mut payload = site_a();
    payload["category"] = json!("invalid");
    let (status, body) = create(&store, &payload);

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("invalid"));
    assert_eq!(list(&store).len(), before);
}

#[test]
fn missing_required_fields_are_rejected() {
    let store = init_test_store();

    for field in ["title", "category", "location", "description"] {
        let mut payload = site_a();
        payload.as_object_mut().unwrap().remove(field);
        let (status, body) = create(&store, &payload);
        assert_eq!(status, 400, "missing {field} should be rejected");
        assert!(body["error"].as_str().unwrap().contains(field));
    }

    assert_eq!(count(&store), 0);
}

#[test]
fn malformed_json_is_a_bad_request() {
    let store = init_test_store();
    let mut req = request(Method::POST, "/api/field-data", None);
    *req.body_mut() = astra::Body::from(String::from("{not json"));

    let resp = respond(req, &store);
    assert_eq!(resp.status(), 400);
    assert_eq!(count(&store), 0);
}

#[test]
fn numeric_strings_are_stored_as_numbers() {
    let store = init_test_store();
    let mut payload = site_a();
    payload["latitude"] = json!("6.5244");
    payload["longitude"] = json!("3.3792");
    payload["time_taken"] = json!("");

    let (status, created) = create(&store, &payload);
    assert_eq!(status, 201);
    assert_eq!(created["latitude"].as_f64(), Some(6.5244));
    assert_eq!(created["longitude"].as_f64(), Some(3.3792));
    assert!(created["time_taken"].is_null());
}

#[test]
fn update_replaces_mutable_fields_only() {
    let store = init_test_store();
    let (_, created) = create(&store, &site_a());
    let id = created["id"].as_str().unwrap();

    let resp = respond(
        request(
            Method::PUT,
            &format!("/api/field-data/{id}"),
            Some(&json!({
                "title": "Site A Resample",
                "category": "environment",
                "location": "Site A",
                "description": "algae visible",
                "created_at": "2020-01-01T00:00:00Z"
            })),
        ),
        &store,
    );
    assert_eq!(resp.status(), 200);
    let updated = body_json(resp);

    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_eq!(updated["title"], "Site A Resample");
    assert_eq!(updated["category"], "environment");
    assert!(updated["latitude"].is_null());
}

#[test]
fn update_of_unknown_id_is_404_and_changes_nothing() {
    let store = init_test_store();
    let (_, created) = create(&store, &site_a());

    let resp = respond(
        request(
            Method::PUT,
            "/api/field-data/000000000000000000000000",
            Some(&site_a()),
        ),
        &store,
    );
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "Field data not found");

    let records = list(&store);
    assert_eq!(records, vec![created]);
}

#[test]
fn update_with_invalid_category_is_rejected() {
    let store = init_test_store();
    let (_, created) = create(&store, &site_a());
    let id = created["id"].as_str().unwrap();

    let mut payload = site_a();
    payload["category"] = json!("weather");
    let resp = respond(
        request(Method::PUT, &format!("/api/field-data/{id}"), Some(&payload)),
        &store,
    );
    assert_eq!(resp.status(), 400);

    let resp = respond(
        request(Method::GET, &format!("/api/field-data/{id}"), None),
        &store,
    );
    assert_eq!(body_json(resp)["category"], "water");
}

#[test]
fn deleting_twice_is_success_then_not_found() {
    let store = init_test_store();
    let (_, created) = create(&store, &site_a());
    let uri = format!("/api/field-data/{}", created["id"].as_str().unwrap());

    let first = respond(request(Method::DELETE, &uri, None), &store);
    assert_eq!(first.status(), 200);
    assert_eq!(
        body_json(first)["message"],
        "Field data deleted successfully"
    );

    let second = respond(request(Method::DELETE, &uri, None), &store);
    assert_eq!(second.status(), 404);

    let gone = respond(request(Method::GET, &uri, None), &store);
    assert_eq!(gone.status(), 404);
}

#[test]
fn malformed_ids_are_not_found() {
    let store = init_test_store();

    for method in [Method::GET, Method::DELETE] {
        let resp = respond(request(method, "/api/field-data/not-an-id", None), &store);
        assert_eq!(resp.status(), 404);
    }

    let resp = respond(
        request(Method::PUT, "/api/field-data/123", Some(&site_a())),
        &store,
    );
    assert_eq!(resp.status(), 404);
}

#[test]
fn unknown_routes_are_404() {
    let store = init_test_store();
    let resp = respond(request(Method::GET, "/api/nothing-here", None), &store);
    assert_eq!(resp.status(), 404);

    let resp = respond(request(Method::PATCH, "/api/field-data", None), &store);
    assert_eq!(resp.status(), 404);
}

#[test]
fn responses_carry_cors_headers() {
    let store = init_test_store();

    let resp = respond(request(Method::GET, "/api/field-data", None), &store);
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );

    let preflight = respond(request(Method::OPTIONS, "/api/field-data", None), &store);
    assert_eq!(preflight.status(), 204);
    let methods = preflight
        .headers()
        .get("Access-Control-Allow-Methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}
