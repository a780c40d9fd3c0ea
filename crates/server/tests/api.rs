use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    router(ServerState {
        ledger: Arc::new(engine::Ledger::new(db)),
        fonts_dir: PathBuf::from("./fonts"),
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn entry_payload(sales: i64, method: &str, payment: i64) -> Value {
    json!({
        "registrationDate": "2026-02-10T00:00:00Z",
        "salesValue": sales,
        "salesNote": "sold produce at the market",
        "paymentMethod": method,
        "paymentValue": payment,
        "operatingExpenses": 30_000,
        "expenseNote": "transport and packaging",
        "dailyStipendPaid": true,
    })
}

#[tokio::test]
async fn create_entry_returns_201_with_computed_total() {
    let app = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/entries",
            entry_payload(200_000, "cash", 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["total"], 110_000);
    assert_eq!(body["status"], "active");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn invalid_entry_returns_422_with_the_full_violation_list() {
    let app = app().await;

    let response = app
        .oneshot(json_request("POST", "/entries", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 7);
    assert!(
        violations
            .iter()
            .any(|violation| violation["field"] == "paymentMethod")
    );
    assert!(
        violations
            .iter()
            .all(|violation| violation["message"].as_str().is_some())
    );
}

#[tokio::test]
async fn listing_entries_includes_the_summary_and_hides_inactive_by_default() {
    let app = app().await;

    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/entries",
                entry_payload(100_000, "cash", 0),
            ))
            .await
            .unwrap(),
    )
    .await;
    app.clone()
        .oneshot(json_request(
            "POST",
            "/entries",
            entry_payload(250_000, "bank_deposit", 250_000),
        ))
        .await
        .unwrap();

    let id = created["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/entries/{id}"),
            json!({"status": "inactive"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.clone().oneshot(get_request("/entries")).await.unwrap()).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["summary"]["count"], 1);
    assert_eq!(body["summary"]["totalSales"], 250_000);

    let all = body_json(
        app.oneshot(get_request("/entries?status=all"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(all["entries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn patching_the_method_snaps_the_payment_over_http() {
    let app = app().await;

    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/entries",
                entry_payload(50_000, "cash", 0),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let body = body_json(
        app.oneshot(json_request(
            "PATCH",
            &format!("/entries/{id}"),
            json!({"paymentMethod": "handover_to_agent"}),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(body["paymentValue"], 50_000);
    assert_eq!(body["salesValue"], 50_000);
}

#[tokio::test]
async fn unknown_entry_returns_404_and_bad_status_filter_400() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/entries/does-not-exist",
            json!({"salesValue": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get_request("/entries?status=archived"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sales_crud_over_http() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/sales",
            json!({
                "date": "2026-02-10T00:00:00Z",
                "timeOfDay": "14:30",
                "productName": "panela block",
                "productValue": 8_000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let sale = body_json(response).await;
    let id = sale["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/sales",
            json!({"productName": "ab"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(app.clone().oneshot(get_request("/sales")).await.unwrap()).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/sales/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(app.oneshot(get_request("/sales")).await.unwrap()).await;
    assert!(body["sales"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_reports_counts() {
    let app = app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/entries",
            entry_payload(100_000, "cash", 0),
        ))
        .await
        .unwrap();

    let body = body_json(app.oneshot(get_request("/dashboard")).await.unwrap()).await;
    assert_eq!(body["entryCount"], 1);
    assert_eq!(body["reportCount"], 1);
    assert_eq!(body["recentEntries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn csv_report_downloads_with_an_attachment_filename() {
    let app = app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/entries",
            entry_payload(150_000, "bank_deposit", 150_000),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/reports/entries?format=csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/csv"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"accounting_entries_"));
    assert!(disposition.ends_with(".csv\""));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Sales,Payment method,Payment,Expenses,Stipend,Total")
    );
    assert!(lines.next().unwrap_or_default().starts_with("2026-02-10,"));
}
