mod common;

use std::time::Duration;

use axum::http::Method;
use chrono::NaiveDate;
use common::{sample_records, serve_stub, StubState};
use racao_core::client::{HttpRecordClient, RecordClient};
use racao_core::errors::ClientError;
use racao_core::purchase::{NewPurchase, RecordId};
use serde_json::json;

fn golden() -> NewPurchase {
    NewPurchase {
        brand: "Golden".into(),
        quantity: 10.5,
        price: 89.9,
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
    }
}

async fn client_for(state: &StubState) -> HttpRecordClient {
    let base_url = serve_stub(state.clone()).await;
    HttpRecordClient::new(&base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn list_all_decodes_the_collection() {
    let state = StubState::with_records(sample_records());
    let client = client_for(&state).await;

    let records = client.list_all().await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, RecordId::new("a1"));
    assert_eq!(records[1].brand, "Premier");
    assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
}

#[tokio::test]
async fn created_record_is_listed_with_a_server_assigned_id() {
    let state = StubState::new();
    let client = client_for(&state).await;

    client.create(&golden()).await.unwrap();
    let records = client.list_all().await.unwrap();

    assert_eq!(records.len(), 1);
    assert!(!records[0].id.as_str().is_empty());
    assert_eq!(records[0].fields(), golden());

    let post = &state.requests()[0];
    assert_eq!(post.method, Method::POST);
    assert_eq!(
        post.body,
        Some(json!({"marca": "Golden", "quantidade": 10.5, "valor": 89.9, "data": "2024-03-15"}))
    );
}

#[tokio::test]
async fn update_sends_the_id_with_every_field() {
    let state = StubState::with_records(sample_records());
    let client = client_for(&state).await;

    client.update(&RecordId::new("b2"), &golden()).await.unwrap();

    let patch = state.requests().pop().unwrap();
    assert_eq!(patch.method, Method::PATCH);
    assert_eq!(
        patch.body,
        Some(json!({
            "id": "b2",
            "marca": "Golden",
            "quantidade": 10.5,
            "valor": 89.9,
            "data": "2024-03-15"
        }))
    );
    let records = client.list_all().await.unwrap();
    let updated = records.iter().find(|r| r.id.as_str() == "b2").unwrap();
    assert_eq!(updated.brand, "Golden");
}

#[tokio::test]
async fn deleted_record_is_no_longer_listed() {
    let state = StubState::with_records(sample_records());
    let client = client_for(&state).await;

    client.delete(&RecordId::new("c3")).await.unwrap();
    let records = client.list_all().await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.id.as_str() != "c3"));
    let delete = &state.requests()[0];
    assert_eq!(delete.method, Method::DELETE);
    assert_eq!(delete.body, Some(json!({"id": "c3"})));
}

#[tokio::test]
async fn unknown_ids_surface_the_server_status() {
    let state = StubState::with_records(sample_records());
    let client = client_for(&state).await;

    let err = client
        .update(&RecordId::new("missing"), &golden())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }), "{err:?}");

    let err = client.delete(&RecordId::new("missing")).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }), "{err:?}");
}

#[tokio::test]
async fn server_errors_keep_the_response_body() {
    let state = StubState::with_records(sample_records());
    state.set_failing(true);
    let client = client_for(&state).await;

    match client.list_all().await.unwrap_err() {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("database offline"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payloads_are_decode_errors() {
    let state = StubState::new();
    state.set_raw_list(r#"[{"marca": "sem id"}]"#);
    let client = client_for(&state).await;

    let err = client.list_all().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "{err:?}");
}
