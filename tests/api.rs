use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Days, Local};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use beneficios_api::repositories::batches::BatchRepository;
use beneficios_api::repositories::beneficiaries::BeneficiaryRepository;
use beneficios_api::repositories::documents::{DocumentRepository, PlaceholderReceiptRenderer};
use beneficios_api::repositories::payment::FixedInstrumentGenerator;
use beneficios_api::services::batches::{BatchRequestHandler, BatchService};
use beneficios_api::services::beneficiaries::{BeneficiaryRequestHandler, BeneficiaryService};
use beneficios_api::services::http::{app, AppState};
use beneficios_api::services::Service;

/// Spins up both service actors with a deterministic instrument generator
/// and returns the router, the way `start_services` wires the real thing.
fn test_app() -> Router {
    let beneficiary_repository = BeneficiaryRepository::new();
    let batch_repository = BatchRepository::new();
    let document_repository = DocumentRepository::new();

    let (beneficiary_tx, mut beneficiary_rx) = mpsc::channel(64);
    let (batch_tx, mut batch_rx) = mpsc::channel(64);

    let beneficiary_handler = BeneficiaryRequestHandler::new(
        beneficiary_repository.clone(),
        document_repository.clone(),
    );
    tokio::spawn(async move {
        let mut service = BeneficiaryService::new();
        service.run(beneficiary_handler, &mut beneficiary_rx).await;
    });

    let batch_handler = BatchRequestHandler::new(
        beneficiary_repository,
        batch_repository,
        document_repository,
        Arc::new(FixedInstrumentGenerator),
        Arc::new(PlaceholderReceiptRenderer),
        "http://localhost:3000".to_string(),
    );
    tokio::spawn(async move {
        let mut service = BatchService::new();
        service.run(batch_handler, &mut batch_rx).await;
    });

    app(AppState {
        beneficiary_channel: beneficiary_tx,
        batch_channel: batch_tx,
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
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

async fn create_beneficiary(app: &Router, full_name: &str, national_id: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/beneficiaries",
            json!({ "fullName": full_name, "nationalId": national_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body
}

fn future_date() -> String {
    (Local::now().date_naive() + Days::new(3))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_create_normalizes_and_rejects_duplicates() {
    let app = test_app();

    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    assert_eq!(created["nationalId"], json!("529.982.247-25"));
    assert_eq!(created["credits"], json!([]));

    // The same identifier in a different formatting variant is a conflict.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/beneficiaries",
            json!({ "fullName": "Outra Pessoa", "nationalId": "529.982.247-25" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("registered"));
}

#[tokio::test]
async fn test_create_requires_both_fields() {
    let app = test_app();

    let (status, body) = send(
        &app,
        json_request("POST", "/beneficiaries", json!({ "fullName": "Maria Silva" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_list_filters_and_is_idempotent() {
    let app = test_app();
    create_beneficiary(&app, "Maria Silva", "52998224725").await;
    create_beneficiary(&app, "Mario Souza", "11144477735").await;

    let (status, all) = send(&app, get("/beneficiaries")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, filtered) = send(&app, get("/beneficiaries?name=maria")).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["fullName"], json!("Maria Silva"));

    let (_, filtered) = send(&app, get("/beneficiaries?nationalId=111.444")).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["fullName"], json!("Mario Souza"));

    let (_, combined) = send(&app, get("/beneficiaries?name=mari&nationalId=529")).await;
    assert_eq!(combined.as_array().unwrap().len(), 1);

    // Reads without intervening writes return identical results.
    let (_, again) = send(&app, get("/beneficiaries")).await;
    assert_eq!(all, again);
}

#[tokio::test]
async fn test_get_update_and_not_found() {
    let app = test_app();
    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let id = created["id"].as_u64().unwrap();

    let (status, fetched) = send(&app, get(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = send(&app, get("/beneficiaries/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Partial update keeps the national id.
    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/beneficiaries/{}", id),
            json!({ "fullName": "Maria S. Costa" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["fullName"], json!("Maria S. Costa"));
    assert_eq!(updated["nationalId"], json!("529.982.247-25"));

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/beneficiaries/999",
            json!({ "fullName": "Ninguem" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_national_id_of_another_beneficiary() {
    let app = test_app();
    create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let second = create_beneficiary(&app, "Joao Souza", "11144477735").await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/beneficiaries/{}", second["id"]),
            json!({ "nationalId": "52998224725" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("another"));
}

#[tokio::test]
async fn test_delete_guards_pending_credits() {
    let app = test_app();
    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let id = created["id"].as_u64().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": id, "amount": "10.50", "creditDate": future_date() }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, delete(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("pending"));

    // Still present after the rejected delete.
    let (status, _) = send(&app, get(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_removes_clean_beneficiary() {
    let app = test_app();
    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let id = created["id"].as_u64().unwrap();

    let (status, body) = send(&app, delete(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, get(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_issue_batch_end_to_end() {
    let app = test_app();
    let first = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let second = create_beneficiary(&app, "Joao Souza", "11144477735").await;
    let date = future_date();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": first["id"], "amount": "10.50", "creditDate": date },
                { "beneficiaryId": second["id"], "amount": "5.25", "creditDate": date }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(body["batch"]["totalAmount"], json!("15.75"));
    assert_eq!(body["batch"]["status"], json!("PENDING"));
    assert_eq!(body["batch"]["creditIds"].as_array().unwrap().len(), 2);
    assert_eq!(body["credits"].as_array().unwrap().len(), 2);
    assert_eq!(body["credits"][0]["credit"]["status"], json!("PENDING"));
    assert_eq!(body["payment"]["pix"]["amount"], json!("15.75"));
    assert_eq!(
        body["payment"]["boleto"]["digitableLine"],
        json!("23793.00000 00000.00000 00000.00000 0 00000")
    );
    assert!(body["receiptUrl"].as_str().unwrap().contains("comprovante"));

    // The batch shows up in the listing and resolves its credits.
    let (_, batches) = send(&app, get("/credit-batches")).await;
    assert_eq!(batches.as_array().unwrap().len(), 1);

    let batch_id = body["batch"]["id"].as_u64().unwrap();
    let (status, resolved) = send(&app, get(&format!("/credit-batches/{}", batch_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["totalAmount"], json!("15.75"));
    let credits = resolved["credits"].as_array().unwrap();
    assert_eq!(credits.len(), 2);
    assert_eq!(credits[0]["beneficiary"]["fullName"], json!("Maria Silva"));

    // Each beneficiary now owns exactly one pending credit of the batch.
    let (_, maria) = send(&app, get(&format!("/beneficiaries/{}", first["id"]))).await;
    assert_eq!(maria["credits"].as_array().unwrap().len(), 1);
    assert_eq!(maria["credits"][0]["batchId"], json!(batch_id));
}

#[tokio::test]
async fn test_issue_batch_validation_failures() {
    let app = test_app();
    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;
    let id = created["id"].as_u64().unwrap();

    let (status, body) = send(
        &app,
        json_request("POST", "/credit-batches", json!({ "credits": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let yesterday = (Local::now().date_naive() - Days::new(1))
        .format("%Y-%m-%d")
        .to_string();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": id, "amount": "10.00", "creditDate": yesterday }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": 999, "amount": "10.00", "creditDate": future_date() }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("999"));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": id, "amount": "0", "creditDate": future_date() }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Maria Silva"));

    // No partial state leaked from the failed issuances.
    let (_, maria) = send(&app, get(&format!("/beneficiaries/{}", id))).await;
    assert_eq!(maria["credits"], json!([]));
    let (_, batches) = send(&app, get("/credit-batches")).await;
    assert_eq!(batches, json!([]));
}

#[tokio::test]
async fn test_boleto_download() {
    let app = test_app();
    let created = create_beneficiary(&app, "Maria Silva", "52998224725").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/credit-batches",
            json!({ "credits": [
                { "beneficiaryId": created["id"], "amount": "10.50", "creditDate": future_date() }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let batch_id = body["batch"]["id"].as_u64().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/boletos/download/{}/qualquer.pdf",
            batch_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "application/pdf"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("attachment"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF-1.3"));

    let (status, _) = send(&app, get("/boletos/download/999/qualquer.pdf")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
