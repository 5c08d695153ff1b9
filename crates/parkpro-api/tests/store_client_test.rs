#![allow(clippy::unwrap_used)]

// Integration tests for `StoreClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parkpro_api::{Error, NewSessionRecord, RecordId, SessionRecord, StoreClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StoreClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    let client = StoreClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_transactions() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "id": 1,
            "owner_name": "Jane Doe",
            "vehicle_name": "Civic",
            "vehicle_type": "car",
            "plate_number": "ABC123",
            "parking_slot": "A1",
            "entry_time": "2024-01-01T08:00",
            "exit_time": null
        },
        {
            "id": "b-2",
            "owner_name": "John Roe",
            "plate_number": "XYZ789",
            "parking_slot": "B3",
            "entry_time": "2024-01-01T09:00",
            "exit_time": "2024-01-01T11:15"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let records = client.list_transactions().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some(RecordId::Number(1)));
    assert_eq!(records[0].owner_name.as_deref(), Some("Jane Doe"));
    assert_eq!(records[0].exit_time, None);
    assert_eq!(records[1].id, Some(RecordId::Text("b-2".into())));
    assert_eq!(records[1].vehicle_name, None);
    assert_eq!(records[1].exit_time.as_deref(), Some("2024-01-01T11:15"));
}

#[tokio::test]
async fn test_list_history_skips_non_object_rows() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "owner_name": "Ana" },
            "junk",
            42,
            { "id": 4, "owner_name": 17 }
        ])))
        .mount(&server)
        .await;

    let records = client.list_history().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].owner_name.as_deref(), Some("Ana"));
    assert_eq!(records[1].owner_name.as_deref(), Some("17"));
}

#[tokio::test]
async fn test_listing_that_is_not_an_array_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
        .mount(&server)
        .await;

    let records = client.list_transactions().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_create_transaction() {
    let (server, client) = setup().await;

    let req = NewSessionRecord {
        owner_name: "Jane Doe".into(),
        vehicle_name: "Civic".into(),
        vehicle_type: "car".into(),
        plate_number: "ABC123".into(),
        entry_time: "2024-01-01T08:00".into(),
        parking_slot: "A1".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/transactions"))
        .and(body_json(json!({
            "owner_name": "Jane Doe",
            "vehicle_name": "Civic",
            "vehicle_type": "car",
            "plate_number": "ABC123",
            "entry_time": "2024-01-01T08:00",
            "parking_slot": "A1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11,
            "owner_name": "Jane Doe",
            "vehicle_name": "Civic",
            "vehicle_type": "car",
            "plate_number": "ABC123",
            "entry_time": "2024-01-01T08:00",
            "parking_slot": "A1"
        })))
        .mount(&server)
        .await;

    let created = client.create_transaction(&req).await.unwrap();

    assert_eq!(created.id, Some(RecordId::Number(11)));
    assert_eq!(created.parking_slot.as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_update_transaction_sends_full_record() {
    let (server, client) = setup().await;

    let record = SessionRecord {
        id: Some(RecordId::Number(11)),
        owner_name: Some("Jane Doe".into()),
        plate_number: Some("ABC123".into()),
        parking_slot: Some("A1".into()),
        entry_time: Some("2024-01-01T08:00".into()),
        exit_time: Some("2024-01-01T10:30".into()),
        ..SessionRecord::default()
    };

    Mock::given(method("PUT"))
        .and(path("/api/transactions/11"))
        .and(body_json(json!({
            "id": 11,
            "owner_name": "Jane Doe",
            "plate_number": "ABC123",
            "parking_slot": "A1",
            "entry_time": "2024-01-01T08:00",
            "exit_time": "2024-01-01T10:30"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "exit_time": "2024-01-01T10:30"
        })))
        .mount(&server)
        .await;

    let updated = client
        .update_transaction(&RecordId::Number(11), &record)
        .await
        .unwrap();

    assert_eq!(updated.exit_time.as_deref(), Some("2024-01-01T10:30"));
}

#[tokio::test]
async fn test_delete_transaction_ignores_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/transactions/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete_transaction(&RecordId::Text("abc".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_occupied_slots() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/parking/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["A1", 5, "C3", null])))
        .mount(&server)
        .await;

    let slots = client.occupied_slots().await.unwrap();

    assert_eq!(slots, vec!["A1".to_owned(), "C3".to_owned()]);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_404_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/transactions/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Transaction not found" })),
        )
        .mount(&server)
        .await;

    let err = client
        .update_transaction(&RecordId::Number(99), &SessionRecord::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Transaction not found");
        }
        other => panic!("expected Api 404 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
        .mount(&server)
        .await;

    let result = client.list_history().await;

    match result {
        Err(Error::Api {
            status,
            ref message,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is locked");
        }
        other => panic!("expected Api 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_empty_body_uses_status_text() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.delete_transaction(&RecordId::Number(1)).await;

    match result {
        Err(Error::Api {
            status,
            ref message,
        }) => {
            assert_eq!(status, 503);
            assert!(message.contains("503"), "message was {message:?}");
        }
        other => panic!("expected Api 503 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_transactions().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert_eq!(body, "<html>oops</html>");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let client = StoreClient::from_reqwest("http://127.0.0.1:1/api", reqwest::Client::new())
        .unwrap();

    let err = client.list_transactions().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}
