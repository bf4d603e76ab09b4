//! HTTP-level tests for [`HttpAgencyApi`] against an in-process stub
//! backend built with Axum.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use sca_client::{AgencyApi, ApiError, ClientConfig, HttpAgencyApi};
use sca_core::models::{SpyCatCreate, SpyCatFilters, SpyCatUpdate, TargetCreate, TargetUpdate};
use sca_core::types::TargetId;

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn record(log: &Log, method: &'static str, path: String, query: HashMap<String, String>, body: Option<Value>) {
    log.lock().unwrap().push(Recorded {
        method,
        path,
        query,
        body,
    });
}

fn cat_json(id: i64, name: &str, salary: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "years_of_experience": 3,
        "breed": "Siamese",
        "salary": salary,
        "created_at": "2024-05-01T12:00:00",
        "active_missions_count": 0,
        "total_missions_count": 2,
        "success_rate": 50.0
    })
}

fn mission_json(id: i64, complete: bool) -> Value {
    json!({
        "id": id,
        "cat_id": 7,
        "complete": complete,
        "targets": [{
            "id": "t-1",
            "name": "Alpha",
            "country": "FR",
            "notes": null,
            "complete": true,
            "mission_id": id,
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        }],
        "created_at": "2024-05-01T12:00:00Z",
        "targets_count": 1,
        "completed_targets_count": 1,
        "progress_percentage": 100.0,
        "is_all_targets_completed": true
    })
}

fn target_json(id: &str, mission_id: i64, notes: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": "Alpha",
        "country": "FR",
        "notes": notes,
        "complete": false,
        "mission_id": mission_id,
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    })
}

async fn create_cat(State(log): State<Log>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    record(&log, "POST", "/api/cats/".into(), HashMap::new(), Some(body.clone()));
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let salary = body["salary"].as_f64().unwrap_or_default();
    (StatusCode::CREATED, Json(cat_json(1, &name, salary)))
}

async fn list_cats(State(log): State<Log>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    record(&log, "GET", "/api/cats/".into(), query, None);
    Json(json!([cat_json(1, "Tom", 1000.0), cat_json(2, "Felix", 2000.0)]))
}

async fn get_cat(Path(id): Path<i64>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id == 99 {
        return Err((StatusCode::NOT_FOUND, Json(json!({"detail": "Cat not found"}))));
    }
    Ok(Json(cat_json(id, "Tom", 1000.0)))
}

async fn update_cat(State(log): State<Log>, Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "PUT", format!("/api/cats/{id}"), HashMap::new(), Some(body.clone()));
    Json(cat_json(id, "Tom", body["salary"].as_f64().unwrap_or_default()))
}

async fn delete_cat(State(log): State<Log>, Path(id): Path<i64>) -> StatusCode {
    record(&log, "DELETE", format!("/api/cats/{id}"), HashMap::new(), None);
    StatusCode::NO_CONTENT
}

async fn available_cats(State(log): State<Log>) -> Json<Value> {
    record(&log, "GET", "/api/cats/available".into(), HashMap::new(), None);
    Json(json!([cat_json(4, "Shadow", 3000.0)]))
}

async fn search_cats(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let q = query.get("q").cloned().unwrap_or_default();
    Json(json!({"cats": [cat_json(3, "Whiskers", 10.0)], "query": q, "total_results": 1}))
}

async fn broken_stats() -> Json<Value> {
    Json(json!({"total_cats": "many"}))
}

async fn assign(State(log): State<Log>, Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "POST", format!("/api/missions/{id}/assign"), HashMap::new(), Some(body));
    Json(mission_json(id, false))
}

async fn complete_mission(Path(id): Path<i64>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id == 5 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Mission already completed"})),
        ));
    }
    Ok(Json(mission_json(id, true)))
}

async fn create_mission(State(log): State<Log>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "POST", "/api/missions/".into(), HashMap::new(), Some(body));
    Json(mission_json(10, false))
}

async fn list_missions(State(log): State<Log>) -> Json<Value> {
    record(&log, "GET", "/api/missions/".into(), HashMap::new(), None);
    Json(json!([mission_json(1, false), mission_json(2, true)]))
}

async fn get_mission(State(log): State<Log>, Path(id): Path<i64>) -> Json<Value> {
    record(&log, "GET", format!("/api/missions/{id}"), HashMap::new(), None);
    Json(mission_json(id, false))
}

async fn delete_mission(State(log): State<Log>, Path(id): Path<i64>) -> StatusCode {
    record(&log, "DELETE", format!("/api/missions/{id}"), HashMap::new(), None);
    StatusCode::NO_CONTENT
}

async fn list_targets(State(log): State<Log>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    record(&log, "GET", "/api/targets/".into(), query, None);
    Json(json!([target_json("t-1", 3, None)]))
}

async fn create_target(State(log): State<Log>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mission_id = body["mission_id"].as_i64().unwrap_or_default();
    record(&log, "POST", "/api/targets/".into(), HashMap::new(), Some(body));
    (StatusCode::CREATED, Json(target_json("t-2", mission_id, None)))
}

// Target handlers record the raw request path to show how ids are encoded.

async fn get_target(State(log): State<Log>, uri: Uri, Path(id): Path<String>) -> Json<Value> {
    record(&log, "GET", uri.path().to_string(), HashMap::new(), None);
    Json(target_json(&id, 3, None))
}

async fn update_target(
    State(log): State<Log>,
    uri: Uri,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let notes = body["notes"].as_str().map(str::to_string);
    record(&log, "PUT", uri.path().to_string(), HashMap::new(), Some(body));
    Json(target_json(&id, 3, notes.as_deref()))
}

async fn complete_target(State(log): State<Log>, uri: Uri, Path(id): Path<String>, body: String) -> Json<Value> {
    let body = (!body.is_empty()).then(|| Value::String(body));
    record(&log, "PATCH", uri.path().to_string(), HashMap::new(), body);
    let mut target = target_json(&id, 3, None);
    target["complete"] = json!(true);
    Json(target)
}

async fn delete_target(State(log): State<Log>, uri: Uri) -> StatusCode {
    record(&log, "DELETE", uri.path().to_string(), HashMap::new(), None);
    StatusCode::NO_CONTENT
}

async fn update_notes(State(log): State<Log>, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let notes = body["notes"].as_str().map(str::to_string);
    record(&log, "PATCH", format!("/api/targets/{id}/notes"), HashMap::new(), Some(body));
    Json(target_json(&id, 3, notes.as_deref()))
}

async fn start_backend() -> (HttpAgencyApi, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/cats/", get(list_cats).post(create_cat))
        .route("/api/cats/available", get(available_cats))
        .route("/api/cats/search", get(search_cats))
        .route("/api/cats/statistics", get(broken_stats))
        .route("/api/cats/{id}", get(get_cat).put(update_cat).delete(delete_cat))
        .route("/api/missions/", get(list_missions).post(create_mission))
        .route("/api/missions/{id}", get(get_mission).delete(delete_mission))
        .route("/api/missions/{id}/assign", post(assign))
        .route("/api/missions/{id}/complete", patch(complete_mission))
        .route("/api/targets/", get(list_targets).post(create_target))
        .route(
            "/api/targets/{id}",
            get(get_target).put(update_target).delete(delete_target),
        )
        .route("/api/targets/{id}/complete", patch(complete_target))
        .route("/api/targets/{id}/notes", patch(update_notes))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = HttpAgencyApi::new(&ClientConfig::new(format!("http://{addr}/")));
    (api, log)
}

fn requests(log: &Log) -> Vec<Recorded> {
    log.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Spy cats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_posts_exact_payload() {
    let (api, log) = start_backend().await;
    let data = SpyCatCreate {
        name: "Agent Whiskers".into(),
        years_of_experience: 3,
        breed: "Siamese".into(),
        salary: 75000.5,
    };

    let cat = api.create_spy_cat(&data).await.expect("create should succeed");
    assert_eq!(cat.name, "Agent Whiskers");
    assert_eq!(cat.salary, 75000.5);

    let recorded = requests(&log);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(
        recorded[0].body,
        Some(json!({
            "name": "Agent Whiskers",
            "years_of_experience": 3,
            "breed": "Siamese",
            "salary": 75000.5
        }))
    );
}

#[tokio::test]
async fn list_sends_only_set_filters() {
    let (api, log) = start_backend().await;
    let filters = SpyCatFilters {
        breed: Some("Bengal".into()),
        experience_min: Some(2),
        ..Default::default()
    };

    let cats = api.list_spy_cats(&filters).await.unwrap();
    assert_eq!(cats.len(), 2);

    let recorded = requests(&log);
    let query = &recorded[0].query;
    assert_eq!(query.len(), 2);
    assert_eq!(query.get("breed").map(String::as_str), Some("Bengal"));
    assert_eq!(query.get("experience_min").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn not_found_carries_server_detail() {
    let (api, _log) = start_backend().await;
    let err = api.get_spy_cat(99).await.unwrap_err();
    assert_matches!(
        err,
        ApiError::RequestFailed { status: 404, ref message } if message.as_deref() == Some("Cat not found")
    );
}

#[tokio::test]
async fn update_puts_salary_only() {
    let (api, log) = start_backend().await;
    let cat = api
        .update_spy_cat(7, &SpyCatUpdate { salary: 90_000.0 })
        .await
        .unwrap();
    assert_eq!(cat.salary, 90_000.0);

    let recorded = requests(&log);
    assert_eq!(recorded[0].path, "/api/cats/7");
    assert_eq!(recorded[0].body, Some(json!({"salary": 90000.0})));
}

#[tokio::test]
async fn delete_accepts_empty_response() {
    let (api, log) = start_backend().await;
    api.delete_spy_cat(7).await.expect("delete should succeed");
    assert_eq!(requests(&log)[0].method, "DELETE");
}

#[tokio::test]
async fn available_gets_available_endpoint() {
    let (api, log) = start_backend().await;
    let cats = api.available_spy_cats().await.unwrap();
    assert_eq!(cats[0].name, "Shadow");

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/api/cats/available");
}

#[tokio::test]
async fn search_passes_query_parameter() {
    let (api, _log) = start_backend().await;
    let results = api.search_spy_cats("whisk").await.unwrap();
    assert_eq!(results.query, "whisk");
    assert_eq!(results.total_results, 1);
    assert_eq!(results.cats[0].name, "Whiskers");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let (api, _log) = start_backend().await;
    let err = api.spy_cat_stats().await.unwrap_err();
    assert_matches!(err, ApiError::InvalidResponse(_));
}

// ---------------------------------------------------------------------------
// Missions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_mission_posts_targets() {
    let (api, log) = start_backend().await;
    let data = sca_core::models::MissionCreate {
        targets: vec![TargetCreate::new("Alpha", "FR").with_notes("Speaks French")],
    };
    let mission = api.create_mission(&data).await.unwrap();
    assert_eq!(mission.targets.len(), 1);

    let recorded = requests(&log);
    assert_eq!(
        recorded[0].body,
        Some(json!({"targets": [{"name": "Alpha", "country": "FR", "notes": "Speaks French"}]}))
    );
}

#[tokio::test]
async fn list_and_get_missions() {
    let (api, log) = start_backend().await;
    let missions = api.list_missions().await.unwrap();
    assert_eq!(missions.len(), 2);
    assert!(missions[1].complete);

    let mission = api.get_mission(4).await.unwrap();
    assert_eq!(mission.id, 4);

    let recorded = requests(&log);
    assert_eq!((recorded[0].method, recorded[0].path.as_str()), ("GET", "/api/missions/"));
    assert_eq!((recorded[1].method, recorded[1].path.as_str()), ("GET", "/api/missions/4"));
}

#[tokio::test]
async fn delete_mission_accepts_empty_response() {
    let (api, log) = start_backend().await;
    api.delete_mission(6).await.expect("delete should succeed");

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "DELETE");
    assert_eq!(recorded[0].path, "/api/missions/6");
}

#[tokio::test]
async fn assign_sends_cat_id() {
    let (api, log) = start_backend().await;
    let mission = api.assign_cat(4, 7).await.unwrap();
    assert_eq!(mission.id, 4);
    assert_eq!(mission.cat_id, Some(7));
    assert_eq!(requests(&log)[0].body, Some(json!({"cat_id": 7})));
}

#[tokio::test]
async fn complete_mission_surfaces_message_field() {
    let (api, _log) = start_backend().await;
    assert!(api.complete_mission(4).await.unwrap().complete);

    let err = api.complete_mission(5).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Mission already completed"));
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_targets_filters_by_mission() {
    let (api, log) = start_backend().await;
    let targets = api.list_targets(Some(3)).await.unwrap();
    assert_eq!(targets[0].mission_id, Some(3));

    api.list_targets(None).await.unwrap();
    let recorded = requests(&log);
    assert_eq!(recorded[0].query.get("mission_id").map(String::as_str), Some("3"));
    assert!(recorded[1].query.is_empty());
}

#[tokio::test]
async fn update_notes_patches_notes_endpoint() {
    let (api, log) = start_backend().await;
    let target = api
        .update_target_notes(&TargetId::from("t-9"), "Moved to Berlin")
        .await
        .unwrap();
    assert_eq!(target.notes.as_deref(), Some("Moved to Berlin"));
    assert_eq!(requests(&log)[0].path, "/api/targets/t-9/notes");
}

#[tokio::test]
async fn create_target_posts_mission_id() {
    let (api, log) = start_backend().await;
    let data = TargetCreate::new("Bravo", "DE").for_mission(3);
    let target = api.create_target(&data).await.unwrap();
    assert_eq!(target.mission_id, Some(3));

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(
        recorded[0].body,
        Some(json!({"name": "Bravo", "country": "DE", "mission_id": 3}))
    );
}

#[tokio::test]
async fn get_target_by_id() {
    let (api, log) = start_backend().await;
    let target = api.get_target(&TargetId::from("t-4")).await.unwrap();
    assert_eq!(target.id, TargetId::from("t-4"));
    assert_eq!(requests(&log)[0].path, "/api/targets/t-4");
}

#[tokio::test]
async fn update_target_puts_notes() {
    let (api, log) = start_backend().await;
    let data = TargetUpdate {
        notes: "Seen near the docks".into(),
    };
    let target = api.update_target(&TargetId::from("t-1"), &data).await.unwrap();
    assert_eq!(target.notes.as_deref(), Some("Seen near the docks"));

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "PUT");
    assert_eq!(recorded[0].path, "/api/targets/t-1");
    assert_eq!(recorded[0].body, Some(json!({"notes": "Seen near the docks"})));
}

#[tokio::test]
async fn complete_target_patches_without_body() {
    let (api, log) = start_backend().await;
    let target = api.complete_target(&TargetId::from("t-1")).await.unwrap();
    assert!(target.complete);

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "PATCH");
    assert_eq!(recorded[0].path, "/api/targets/t-1/complete");
    assert_eq!(recorded[0].body, None);
}

#[tokio::test]
async fn delete_target_accepts_empty_response() {
    let (api, log) = start_backend().await;
    api.delete_target(&TargetId::from("t-1")).await.expect("delete should succeed");

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "DELETE");
    assert_eq!(recorded[0].path, "/api/targets/t-1");
}

#[tokio::test]
async fn target_ids_are_sent_as_one_encoded_segment() {
    let (api, log) = start_backend().await;
    let target = api.get_target(&TargetId::from("a/b c")).await.unwrap();
    assert_eq!(target.id, TargetId::from("a/b c"));
    assert_eq!(requests(&log)[0].path, "/api/targets/a%2Fb%20c");
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_backend_is_network_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpAgencyApi::new(&ClientConfig::new(format!("http://{addr}")));
    let err = api.list_missions().await.unwrap_err();
    assert_matches!(err, ApiError::NetworkUnavailable(_));
}
