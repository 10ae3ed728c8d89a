//! API integration tests

use std::sync::{
    atomic::{AtomicI64, AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bookshelf_api::{
    create_router,
    repository::Repository,
    services::{Clock, IdGenerator, Services},
    AppState,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Ids "id-0000000000000", "id-0000000000001", ...
#[derive(Default)]
struct CountingIds(AtomicUsize);

impl IdGenerator for CountingIds {
    fn generate(&self) -> String {
        format!("id-{:013}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

/// Starts at 2024-05-01T12:00:00Z and advances one second per reading
#[derive(Default)]
struct TickingClock(AtomicI64);

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        start + Duration::seconds(self.0.fetch_add(1, Ordering::SeqCst))
    }
}

fn app() -> Router {
    let services = Services::new(
        Repository::in_memory(),
        Arc::new(TickingClock::default()),
        Arc::new(CountingIds::default()),
    );
    create_router(AppState {
        services: Arc::new(services),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("Failed to build request"))
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

fn book(name: &str, page_count: i64, read_page: i64, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

fn listed_ids(body: &Value) -> Vec<Value> {
    body["data"]["books"]
        .as_array()
        .expect("No books array")
        .iter()
        .map(|b| b["id"].clone())
        .collect()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    let raw = value.as_str().expect("Timestamp is not a string");
    assert!(raw.ends_with('Z'), "not UTC: {}", raw);
    DateTime::parse_from_rfc3339(raw)
        .expect("Timestamp is not RFC 3339")
        .with_timezone(&Utc)
}

async fn create(app: &Router, payload: Value) -> String {
    let (status, body) = send(app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["bookId"].as_str().expect("No book ID").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_book() {
    let app = app();

    let payload = book("Alpha", 100, 100, false);
    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book added successfully");
    let id = body["data"]["bookId"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 16);

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["data"]["book"];
    assert_eq!(record["id"], id.as_str());
    assert_eq!(record["name"], "Alpha");
    assert_eq!(record["year"], 2010);
    assert_eq!(record["pageCount"], 100);
    assert_eq!(record["readPage"], 100);
    assert_eq!(record["finished"], true);
    assert_eq!(record["reading"], false);
    assert_eq!(
        timestamp(&record["insertedAt"]),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    );
    assert_eq!(record["insertedAt"], record["updatedAt"]);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let app = app();

    let mut missing_name = book("x", 10, 5, false);
    missing_name.as_object_mut().unwrap().remove("name");
    let (status, body) = send(&app, Method::POST, "/books", Some(missing_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Failed to add book. Please provide the book name");

    let over_read = book("Beta", 50, 60, false);
    let (status, body) = send(&app, Method::POST, "/books", Some(over_read)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to add book. readPage must not exceed pageCount");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn test_malformed_payload_is_fail_envelope() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"name": "Alpha", "pageCount": "many"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_list_books_and_filters() {
    let app = app();
    let a = create(&app, book("The Dog Story", 100, 100, false)).await;
    let b = create(&app, book("Cats", 100, 10, true)).await;
    let c = create(&app, book("dogma", 100, 50, false)).await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["books"],
        json!([
            {"id": a, "name": "The Dog Story", "publisher": "Dicoding Indonesia"},
            {"id": b, "name": "Cats", "publisher": "Dicoding Indonesia"},
            {"id": c, "name": "dogma", "publisher": "Dicoding Indonesia"}
        ])
    );

    let (_, body) = send(&app, Method::GET, "/books?name=DOG", None).await;
    assert_eq!(listed_ids(&body), vec![json!(a), json!(c)]);

    let (_, body) = send(&app, Method::GET, "/books?reading=1", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["books"][0]["id"], b.as_str());

    let (_, body) = send(&app, Method::GET, "/books?finished=0", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/books?name=dog&finished=0", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["books"][0]["id"], c.as_str());
}

#[tokio::test]
async fn test_get_missing_book() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/books/xxxxxxxxxxxxxxxx", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn test_update_book() {
    let app = app();
    let id = create(&app, book("Alpha", 100, 10, true)).await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{}", id), None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(book("Alpha Revised", 200, 200, false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book updated successfully");

    let (_, after) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    let (before, after) = (&before["data"]["book"], &after["data"]["book"]);
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert!(timestamp(&after["updatedAt"]) > timestamp(&before["updatedAt"]));
    assert_eq!(after["name"], "Alpha Revised");
    assert_eq!(after["pageCount"], 200);
    assert_eq!(after["reading"], false);
    assert_eq!(after["finished"], true);
}

#[tokio::test]
async fn test_update_failures() {
    let app = app();
    let id = create(&app, book("Alpha", 100, 10, true)).await;

    let replacement = book("X", 1, 1, false);
    let (status, body) = send(&app, Method::PUT, "/books/missing", Some(replacement)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to update book. Id not found");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(json!({"pageCount": 1, "readPage": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to update book. Please provide the book name");

    let over_read = book("Alpha", 5, 6, true);
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(over_read)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to update book. readPage must not exceed pageCount");

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["name"], "Alpha");
    assert_eq!(body["data"]["book"]["pageCount"], 100);
}

#[tokio::test]
async fn test_delete_book() {
    let app = app();
    let a = create(&app, book("A", 1, 1, false)).await;
    let b = create(&app, book("B", 1, 1, false)).await;
    let c = create(&app, book("C", 1, 1, false)).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to delete book. Id not found");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(listed_ids(&body), vec![json!(a), json!(c)]);
}

#[tokio::test]
async fn test_list_with_repeated_query_key() {
    let app = app();
    create(&app, book("Alpha", 100, 10, true)).await;
    let idle = create(&app, book("Beta", 100, 10, false)).await;

    let (status, body) = send(&app, Method::GET, "/books?reading=1&reading=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(listed_ids(&body), vec![json!(idle)]);

    let (status, body) = send(&app, Method::GET, "/books?name=zzz&name=alp", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["books"][0]["name"], "Alpha");
}

#[tokio::test]
async fn test_finished_with_one_page_field() {
    let app = app();

    let id = create(&app, json!({"name": "Only total", "pageCount": 100})).await;
    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["finished"], false);
    assert_eq!(body["data"]["book"]["readPage"], Value::Null);

    let id = create(&app, json!({"name": "Only read", "readPage": 5})).await;
    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["finished"], false);

    let id = create(&app, json!({"name": "No pages"})).await;
    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["finished"], true);
}

#[tokio::test]
async fn test_null_name_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"name": null, "pageCount": 10, "readPage": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Failed to add book. Please provide the book name");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"], json!([]));
}
