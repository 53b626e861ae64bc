//! 远程存储集成测试，使用本地 axum 桩服务

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use medihub_core::MediHubError;
use medihub_records::ExternalRecord;
use medihub_store::{
    Condition, FetchQuery, RecordStore, RemoteSettings, RemoteStore, SortDirection,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct StubState {
    last_query: Arc<Mutex<Option<Value>>>,
    last_headers: Arc<Mutex<Option<(String, String)>>>,
}

impl StubState {
    fn remember_headers(&self, headers: &HeaderMap) {
        let project = headers
            .get("x-project-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *self.last_headers.lock().unwrap() = Some((project, auth));
    }
}

async fn query_records(
    State(state): State<StubState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.remember_headers(&headers);
    *state.last_query.lock().unwrap() = Some(body);

    match collection.as_str() {
        "patient_c" => Json(json!({
            "success": true,
            "data": [
                {"Id": 2, "name_c": "James Wilson", "allergies_c": "Sulfa drugs"},
                {"Id": 1, "name_c": "Sarah Johnson", "allergies_c": "Penicillin, Peanuts"}
            ]
        }))
        .into_response(),
        "metric_c" => Json(json!({"success": false, "message": "Table not available"})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn get_record(Path((_collection, id)): Path<(String, i64)>) -> impl IntoResponse {
    if id == 1 {
        Json(json!({"success": true, "data": {"Id": 1, "name_c": "Sarah Johnson"}})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn create_records(Json(body): Json<Value>) -> Json<Value> {
    let records = body["records"].as_array().cloned().unwrap_or_default();
    let results: Vec<Value> = records
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| {
            if record.get("name_c").and_then(Value::as_str).unwrap_or("").is_empty() {
                json!({"success": false, "message": "name_c is required"})
            } else {
                record["Id"] = json!(100 + i);
                json!({"success": true, "data": record})
            }
        })
        .collect();
    Json(json!({"success": true, "results": results}))
}

async fn update_records(Json(body): Json<Value>) -> Json<Value> {
    let record = body["records"][0].clone();
    Json(json!({"success": true, "results": [{"success": true, "data": record}]}))
}

async fn delete_records(Json(body): Json<Value>) -> Json<Value> {
    let results: Vec<Value> = body["RecordIds"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|id| {
            if id == json!(1) {
                json!({"success": true})
            } else {
                json!({"success": false, "code": 404, "message": "Record not found"})
            }
        })
        .collect();
    Json(json!({"success": true, "results": results}))
}

async fn spawn_stub() -> (RemoteStore, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/tables/:collection/records/query", post(query_records))
        .route("/tables/:collection/records/:id", get(get_record))
        .route(
            "/tables/:collection/records",
            post(create_records).put(update_records).delete(delete_records),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = RemoteStore::new(RemoteSettings {
        endpoint: format!("http://{}", addr),
        project_id: "medihub-test".to_string(),
        public_key: "pk-test".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    (store, state)
}

fn record(value: Value) -> ExternalRecord {
    ExternalRecord::try_from(value).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_query_and_credentials() {
    let (store, state) = spawn_stub().await;
    let query = FetchQuery::new()
        .select(&["name_c"])
        .filter(Condition::equal_to("status_c", "Admitted"))
        .order_by("Id", SortDirection::Desc);

    let records = store
        .fetch("patient_c", &query)
        .await
        .unwrap()
        .into_records("fetch patients")
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), Some(2));

    let sent = state.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(sent["orderBy"][0]["sorttype"], "DESC");
    assert_eq!(sent["where"][0]["FieldName"], "status_c");

    let (project, auth) = state.last_headers.lock().unwrap().clone().unwrap();
    assert_eq!(project, "medihub-test");
    assert_eq!(auth, "Bearer pk-test");
}

#[tokio::test]
async fn test_unsuccessful_envelope_and_http_error() {
    let (store, _) = spawn_stub().await;

    let envelope = store.fetch("metric_c", &FetchQuery::new()).await.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Table not available"));

    let err = store.fetch("unknown_c", &FetchQuery::new()).await.unwrap_err();
    assert!(matches!(err, MediHubError::Transport(_)));
}

#[tokio::test]
async fn test_get_by_id_maps_404_to_missing() {
    let (store, _) = spawn_stub().await;

    let found = store.get_by_id("patient_c", 1).await.unwrap();
    assert_eq!(found.data.unwrap().string("name_c"), "Sarah Johnson");

    let missing = store.get_by_id("patient_c", 42).await.unwrap();
    let err = missing
        .into_record("fetch patient", "Patient not found")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_batch_writes() {
    let (store, _) = spawn_stub().await;

    let created = store
        .create("patient_c", vec![record(json!({"name_c": "Maria Garcia"}))])
        .await
        .unwrap()
        .into_first_record("create patient")
        .unwrap();
    assert_eq!(created.id(), Some(100));

    let rejected = store
        .create(
            "patient_c",
            vec![record(json!({"name_c": "Ok"})), record(json!({"age_c": 3}))],
        )
        .await
        .unwrap()
        .into_records("create patient")
        .unwrap_err();
    assert!(matches!(rejected, MediHubError::Validation(msg) if msg == "name_c is required"));

    let updated = store
        .update("patient_c", vec![record(json!({"Id": 1, "room_c": "12B"}))])
        .await
        .unwrap()
        .into_first_record("update patient")
        .unwrap();
    assert_eq!(updated.string("room_c"), "12B");

    let deleted = store.delete("patient_c", vec![1]).await.unwrap();
    assert!(deleted.into_records("delete patient").is_ok());

    let missing = store.delete("patient_c", vec![7]).await.unwrap();
    assert!(missing.into_records("delete patient").unwrap_err().is_not_found());
}
