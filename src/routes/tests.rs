use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    build_router,
    config::Config,
    services::store::{testing::FlakyStore, MemoryRatingStore, RatingStore},
    AppState,
};

fn app_with(store: Arc<dyn RatingStore>) -> Router {
    build_router(AppState::new(store, Arc::new(Config::memory())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_store_state() {
    let app = app_with(Arc::new(MemoryRatingStore::new()));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let app = app_with(Arc::new(FlakyStore::failing_fetch()));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn weekdays_are_listed_in_order() {
    let app = app_with(Arc::new(MemoryRatingStore::new()));
    let (status, body) = send(&app, "GET", "/weekdays", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0], json!({ "key": "montag", "label": "Montag" }));
    assert_eq!(body[4]["label"], "Freitag");
}

#[tokio::test]
async fn create_and_list_ratings() {
    let store = Arc::new(MemoryRatingStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/ratings",
        Some(json!({
            "day": "Dienstag",
            "categories": { "vegan": 5, "meatFish": 3 },
            "comment": "Lecker!"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["day"], "Dienstag");
    assert_eq!(body["categories"]["vegetarian"], 0);
    assert!(body["date"].is_string());

    let (status, body) = send(&app, "GET", "/ratings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["comment"], "Lecker!");
}

#[tokio::test]
async fn invalid_ratings_are_rejected_before_storage() {
    let store = Arc::new(MemoryRatingStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(&app, "POST", "/ratings", Some(json!({ "day": "Samstag" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Samstag"));

    let (status, _) = send(
        &app,
        "POST",
        "/ratings",
        Some(json!({ "day": "Montag", "categories": { "salad": 6 } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn store_failure_maps_to_service_unavailable() {
    let app = app_with(Arc::new(FlakyStore::failing_inserts()));
    let (status, body) = send(&app, "POST", "/ratings", Some(json!({ "day": "Montag" }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn overview_of_empty_store_has_no_data() {
    let app = app_with(Arc::new(MemoryRatingStore::new()));
    let (status, body) = send(&app, "GET", "/ratings/overview", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["comments"], json!([]));
    for stats in body["categories"].as_array().unwrap() {
        assert_eq!(stats["average"], Value::Null);
        assert_eq!(stats["average_display"], "—");
        assert_eq!(stats["count"], 0);
    }
}

#[tokio::test]
async fn session_walkthrough() {
    let store = Arc::new(MemoryRatingStore::new());
    let app = app_with(store.clone());

    let (status, snapshot) = send(&app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(snapshot["view"], "form");
    assert_eq!(snapshot["can_view_overview"], false);
    let id = snapshot["id"].as_str().unwrap().to_string();
    let actions = format!("/sessions/{id}/actions");

    for action in [
        json!({ "type": "selectDay", "day": "Mittwoch" }),
        json!({ "type": "setCategoryScore", "category": "vegan", "stars": 4 }),
        json!({ "type": "setComment", "comment": "  Gern wieder  " }),
    ] {
        let (status, _) = send(&app, "POST", &actions, Some(action)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, snapshot) = send(&app, "POST", &actions, Some(json!({ "type": "submit" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["view"], "overview");
    assert_eq!(snapshot["total"], 1);
    assert_eq!(snapshot["overview"]["categories"][0]["average_display"], "4.0");
    assert_eq!(
        snapshot["overview"]["comments"],
        json!([{ "day": "Mittwoch", "comment": "Gern wieder" }])
    );
    assert_eq!(store.count().await.unwrap(), 1);

    let (_, snapshot) = send(&app, "POST", &actions, Some(json!({ "type": "backToForm" }))).await;
    assert_eq!(snapshot["view"], "form");
    assert_eq!(snapshot["selected_day"], "Mittwoch");
    assert_eq!(snapshot["overview"], Value::Null);
    assert_eq!(snapshot["can_view_overview"], true);

    let (status, _) = send(&app, "DELETE", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_submit_failure_keeps_form() {
    let store = Arc::new(FlakyStore::failing_inserts());
    let app = app_with(store.clone());

    let (_, snapshot) = send(&app, "POST", "/sessions", None).await;
    let actions = format!("/sessions/{}/actions", snapshot["id"].as_str().unwrap());
    send(
        &app,
        "POST",
        &actions,
        Some(json!({ "type": "setCategoryScore", "category": "dessert", "stars": 2 })),
    )
    .await;

    let (status, snapshot) = send(&app, "POST", &actions, Some(json!({ "type": "submit" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["view"], "form");
    assert_eq!(snapshot["total"], 0);
    assert_eq!(snapshot["error"]["kind"], "submit");
    assert_eq!(snapshot["draft"]["categories"]["dessert"], 2);

    store.set_fail_insert(false);
    let (_, snapshot) = send(&app, "POST", &actions, Some(json!({ "type": "submit" }))).await;
    assert_eq!(snapshot["view"], "overview");
    assert_eq!(snapshot["total"], 1);
    assert_eq!(snapshot["error"], Value::Null);
    assert_eq!(store.inner.count().await.unwrap(), 1);
}

#[tokio::test]
async fn session_with_failed_load_shows_fetch_banner() {
    let app = app_with(Arc::new(FlakyStore::failing_fetch()));
    let (status, snapshot) = send(&app, "POST", "/sessions", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(snapshot["view"], "form");
    assert_eq!(snapshot["fetch_error"]["kind"], "fetch");
    assert_eq!(snapshot["error"], Value::Null);
    assert_eq!(snapshot["can_submit"], true);
}

#[tokio::test]
async fn fetch_banner_outlives_validation_errors() {
    let app = app_with(Arc::new(FlakyStore::failing_fetch()));
    let (_, snapshot) = send(&app, "POST", "/sessions", None).await;
    let actions = format!("/sessions/{}/actions", snapshot["id"].as_str().unwrap());

    let (_, snapshot) = send(
        &app,
        "POST",
        &actions,
        Some(json!({ "type": "setCategoryScore", "category": "vegan", "stars": 0 })),
    )
    .await;
    assert_eq!(snapshot["error"]["kind"], "validation");
    assert_eq!(snapshot["fetch_error"]["kind"], "fetch");

    let (_, snapshot) = send(
        &app,
        "POST",
        &actions,
        Some(json!({ "type": "setCategoryScore", "category": "vegan", "stars": 3 })),
    )
    .await;
    assert_eq!(snapshot["error"], Value::Null);
    assert_eq!(snapshot["fetch_error"]["kind"], "fetch");
    assert_eq!(snapshot["total"], 0);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = app_with(Arc::new(MemoryRatingStore::new()));
    let uri = format!("/sessions/{}/actions", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "POST", &uri, Some(json!({ "type": "submit" }))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Sitzung nicht gefunden");
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = app_with(Arc::new(MemoryRatingStore::new()));
    send(&app, "POST", "/sessions", None).await;
    let (status, body) = send(&app, "GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("lunch_sessions_created_total"));
}
