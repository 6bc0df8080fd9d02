use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use server::{ServerState, router};

async fn state() -> ServerState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();
    ServerState::new(engine, "₹")
}

async fn app() -> Router {
    router(state().await)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, created) = send(app, json_request("POST", "/expenses", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created
}

fn trip(date: &str, from: &str, to: &str, client: &str, kilometers: f64) -> Value {
    json!({
        "date": date,
        "fromLocation": from,
        "toLocation": to,
        "clientName": client,
        "kilometers": kilometers,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, bare_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_201_with_derived_total() {
    let app = app().await;

    let created = create(
        &app,
        json!({
            "date": "2024-01-15",
            "fromLocation": "  Pune ",
            "toLocation": "Mumbai",
            "clientName": "Acme",
            "kilometers": "12.5",
        }),
    )
    .await;

    assert_eq!(created["fromLocation"], "Pune");
    assert_eq!(created["date"], "2024-01-15");
    assert_eq!(created["ratePerKm"].as_f64(), Some(3.0));
    assert_eq!(created["total"].as_f64(), Some(37.5));
    assert!(created["id"].is_string());
    assert!(created["createdAt"].is_string());
}

#[tokio::test]
async fn create_with_missing_fields_is_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/expenses",
            json!({ "fromLocation": "Pune", "clientName": "", "kilometers": null }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required fields: date, toLocation, clientName, kilometers"
    );

    let (_, listed) = send(&app, bare_request("GET", "/expenses")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn create_with_out_of_range_value_is_400() {
    let app = app().await;

    let mut body = trip("2024-01-15", "Pune", "Mumbai", "Acme", 10.0);
    body["ratePerKm"] = json!(-1);
    let (status, body) = send(&app, json_request("POST", "/expenses", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("ratePerKm"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/expenses")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not-json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn get_by_id_and_unknown_ids() {
    let app = app().await;
    let created = create(&app, trip("2024-01-15", "Pune", "Mumbai", "Acme", 10.0)).await;
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = send(&app, bare_request("GET", &format!("/expenses/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["total"], created["total"]);

    let (status, _) = send(&app, bare_request("GET", "/expenses/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        bare_request("GET", "/expenses/0190f3a4-5b6c-7d8e-9f00-112233445566"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Expense not found");
}

#[tokio::test]
async fn update_recomputes_total_with_stored_rate() {
    let app = app().await;
    let mut body = trip("2024-01-15", "Pune", "Mumbai", "Acme", 10.0);
    body["ratePerKm"] = json!(5);
    let created = create(&app, body).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        json_request("PUT", &format!("/expenses/{id}"), json!({ "kilometers": 20 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["ratePerKm"].as_f64(), Some(5.0));
    assert_eq!(updated["total"].as_f64(), Some(100.0));
    assert_eq!(updated["clientName"], "Acme");
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let app = app().await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/expenses/0190f3a4-5b6c-7d8e-9f00-112233445566",
            json!({ "kilometers": 20 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_delete_again() {
    let app = app().await;
    let created = create(&app, trip("2024-01-15", "Pune", "Mumbai", "Acme", 10.0)).await;
    let uri = format!("/expenses/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, bare_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = send(&app, bare_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_date_newest_first() {
    let app = app().await;
    for (date, client) in [
        ("2024-01-01", "First"),
        ("2024-01-15", "Middle"),
        ("2024-02-01", "Outside"),
    ] {
        create(&app, trip(date, "Pune", "Mumbai", client, 1.0)).await;
    }

    let (status, listed) = send(
        &app,
        bare_request("GET", "/expenses?startDate=2024-01-01&endDate=2024-01-31"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let clients: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["clientName"].as_str().unwrap())
        .collect();
    assert_eq!(clients, ["Middle", "First"]);
}

#[tokio::test]
async fn list_with_limit_returns_a_page() {
    let app = app().await;
    for day in 1..=3 {
        create(
            &app,
            trip(&format!("2024-03-0{day}"), "Pune", "Mumbai", "Acme", 10.0),
        )
        .await;
    }

    let (status, page) = send(&app, bare_request("GET", "/expenses?limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalSum"].as_f64(), Some(90.0));
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["date"], "2024-03-03");
}

#[tokio::test]
async fn huge_page_number_is_400() {
    let app = app().await;
    create(&app, trip("2024-03-01", "Pune", "Mumbai", "Acme", 10.0)).await;

    let (status, body) = send(
        &app,
        bare_request("GET", "/expenses?page=18446744073709551615&limit=200"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid page: is too large");
}

#[tokio::test]
async fn inverted_date_range_is_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        bare_request("GET", "/expenses?startDate=2024-02-01&endDate=2024-01-01"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn export_returns_an_xlsx_attachment() {
    let app = app().await;
    create(&app, trip("2024-01-15", "Pune", "Mumbai", "Acme", 10.0)).await;

    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/expenses/export?startDate=2024-01-01&endDate=2024-01-31",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=expenses.xlsx"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn options_are_sorted_and_deduplicated() {
    let app = app().await;
    create(&app, trip("2024-01-15", "Pune", "Mumbai", "Initech", 10.0)).await;
    create(&app, trip("2024-01-16", "Mumbai", "Pune", "Acme", 10.0)).await;

    let (status, options) = send(&app, bare_request("GET", "/options")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        options,
        json!({ "locations": ["Mumbai", "Pune"], "clients": ["Acme", "Initech"] })
    );
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(state().await, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(r#"{"status":"ok"}"#));
}
