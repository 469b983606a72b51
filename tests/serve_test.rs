//! # HTTP API Tests
//!
//! Start the real router on an ephemeral port backed by an in-memory store and
//! drive it with reqwest.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test serve_test
//! ```

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use drink_log::form::Logbook;
use drink_log::serve::{build_router, AppState};
use drink_log::store::MemoryStore;
use drink_log::StoredRow;

/// Start a test API server
async fn start_test_api_server(logbook: Logbook) -> (String, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::new(logbook, 65.0, 350));
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    (url, handle)
}

fn memory_logbook() -> Logbook {
    Logbook::new(Box::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_health() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let response = reqwest::get(format!("{}/health", server_url)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_drinks_lists_catalogue_in_order() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let drinks: Vec<Value> = reqwest::get(format!("{}/api/drinks", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(drinks.len(), 5);
    assert_eq!(drinks[0]["key"], "beer");
    assert_eq!(drinks[0]["strength_pct"], 5.0);
    assert_eq!(drinks[4]["label"], "Whisky strong (50%)");
}

#[tokio::test]
async fn test_estimate_uses_defaults() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let data: Value = reqwest::get(format!("{}/api/estimate", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(data["drink"], "Beer (5%)");
    assert_eq!(data["amount_ml"], 350);
    assert_eq!(data["grams_display"], "14.0 g");
    assert_eq!(data["hours_display"], "2.2 h");
    assert_eq!(data["clear_time"].as_str().unwrap().len(), 5);
}

#[tokio::test]
async fn test_estimate_rejects_light_weight() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let response = reqwest::get(format!(
        "{}/api/estimate?drink=whisky&amount_ml=100&weight_kg=25",
        server_url
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 400);
    let data: Value = response.json().await.unwrap();
    assert!(data["error"].as_str().unwrap().contains("weight"));
}

#[tokio::test]
async fn test_submit_then_summaries() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;
    let client = reqwest::Client::new();

    for (date, drink, amount) in [
        ("2024-01-31", "beer", 350),
        ("2024-02-01", "wine", 180),
        ("2024-02-01T23:30", "whisky", 100),
    ] {
        let response = client
            .post(format!("{}/api/entries", server_url))
            .json(&json!({ "date": date, "drink": drink, "amount_ml": amount }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "submit {} failed", date);
    }

    let entries: Value = reqwest::get(format!("{}/api/entries", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries["entries"].as_array().unwrap().len(), 3);
    assert_eq!(entries["entries"][2]["date"], "2024-02-01");

    let daily: Vec<Value> = reqwest::get(format!("{}/api/summary/day", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0]["bucket_start"], "2024-01-31");
    let feb_first = daily[1]["total_alcohol_grams"].as_f64().unwrap();
    assert!((feb_first - (17.28 + 32.0)).abs() < 1e-9);

    // Wednesday Jan 31 and Thursday Feb 1 share the week starting Monday Jan 29
    let weekly: Vec<Value> = reqwest::get(format!("{}/api/summary/week", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly[0]["bucket_start"], "2024-01-29");

    let monthly: Vec<Value> = reqwest::get(format!("{}/api/summary/Month", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[1]["bucket_start"], "2024-02-01");
}

#[tokio::test]
async fn test_submit_rejects_unlisted_amount() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/entries", server_url))
        .json(&json!({ "drink": "beer", "amount_ml": 330 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let entries: Value = reqwest::get(format!("{}/api/entries", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(entries["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_granularity() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    let response = reqwest::get(format!("{}/api/summary/year", server_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_unavailable_store_serves_reads_and_refuses_writes() {
    let (server_url, _handle) =
        start_test_api_server(Logbook::unavailable("sheet offline")).await;

    let dashboard: Value = reqwest::get(format!("{}/api/dashboard", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["entry_count"], 0);
    assert!(dashboard["warning"]
        .as_str()
        .unwrap()
        .contains("sheet offline"));

    let response = reqwest::Client::new()
        .post(format!("{}/api/entries", server_url))
        .json(&json!({ "drink": "beer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_dashboard_reports_skipped_rows() {
    let store = MemoryStore::with_rows(vec![
        StoredRow {
            date: "2024-13-40".to_string(),
            drink_type: "Beer (5%)".to_string(),
            amount: "350".to_string(),
            alcohol_g: "14".to_string(),
        },
        StoredRow {
            date: "2024-03-03".to_string(),
            drink_type: "Sake (15%)".to_string(),
            amount: "180".to_string(),
            alcohol_g: "21.6".to_string(),
        },
    ]);
    let (server_url, _handle) = start_test_api_server(Logbook::new(Box::new(store))).await;

    let dashboard: Value = reqwest::get(format!("{}/api/dashboard?drink=wine", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["entry_count"], 1);
    assert_eq!(dashboard["skipped_rows"], 1);
    assert_eq!(dashboard["charts"]["day"][0]["total_alcohol_grams"], 21.6);
}

#[tokio::test]
async fn test_bad_query_string_gets_json_error() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;

    for path in ["/api/estimate?amount_ml=-100", "/api/dashboard?weight_kg=heavy"] {
        let response = reqwest::get(format!("{}{}", server_url, path))
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{}", path);
        let data: Value = response.json().await.unwrap();
        assert!(data["error"].is_string(), "{}: {}", path, data);
    }
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let (server_url, _handle) = start_test_api_server(memory_logbook()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/entries", server_url))
        .header("content-type", "application/json")
        .body("{\"drink\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let data: Value = response.json().await.unwrap();
    assert!(data["error"].is_string());

    let response = client
        .post(format!("{}/api/entries", server_url))
        .json(&json!({ "amount_ml": -350 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let data: Value = response.json().await.unwrap();
    assert!(data["error"].is_string());

    let entries: Value = reqwest::get(format!("{}/api/entries", server_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(entries["entries"].as_array().unwrap().is_empty());
}
