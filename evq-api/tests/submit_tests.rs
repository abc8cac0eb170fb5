//! Integration tests for the questionnaire submission endpoint
//!
//! Exercises the full stack: router, handler, submission service, and the
//! SQLite-backed stores, against a temp-file database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use evq_api::questionnaire::SubmissionService;
use evq_api::repo::{SqliteCatalog, SqliteEventStore, SqliteSubmissionStore, SubmissionStore};
use evq_api::{build_router, AppState};
use evq_common::config::CatalogFile;
use evq_common::db::{apply_catalog, init_database};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const Q_CROWD_LABEL: &str = "Expecting over 500 attendees?";
const Q_SOUND_LABEL: &str = "Will amplified sound be used?";

/// Test helper: temp database with a two-tier, two-question catalog and
/// one registered event.
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("evq.db"))
        .await
        .expect("Should initialize database");

    let catalog: CatalogFile = toml::from_str(&format!(
        r#"
        [[tiers]]
        id = "class_one"
        weight = 0

        [[tiers]]
        id = "class_two"
        weight = 10

        [[questions]]
        id = "q_crowd"
        label = "{}"
        tier = "class_one"

        [[questions]]
        id = "q_sound"
        label = "{}"
        tier = "class_two"
        "#,
        Q_CROWD_LABEL, Q_SOUND_LABEL
    ))
    .expect("Should parse catalog");
    apply_catalog(&pool, &catalog).await.expect("Should apply catalog");

    sqlx::query("INSERT INTO events (guid, name, tier, created_at) VALUES (?, ?, NULL, ?)")
        .bind("ev-1")
        .bind("Street Parade")
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .expect("Should insert event");

    (dir, pool)
}

/// Test helper: build the app router over the real SQLite stores
fn setup_app(pool: SqlitePool) -> axum::Router {
    let events = Arc::new(SqliteEventStore::new(pool.clone()));
    let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
    let store = Arc::new(SqliteSubmissionStore::new(pool));
    let service = Arc::new(SubmissionService::new(events, catalog.clone(), catalog, store));
    build_router(AppState::new(service))
}

/// Test helper: POST a JSON body
fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn payload(crowd: Value, sound: Value) -> Value {
    json!({
        "q_crowd": { (Q_CROWD_LABEL): crowd },
        "q_sound": { (Q_SOUND_LABEL): sound },
    })
}

async fn event_tier(pool: &SqlitePool) -> Option<String> {
    sqlx::query_scalar("SELECT tier FROM events WHERE guid = 'ev-1'")
        .fetch_one(pool)
        .await
        .unwrap()
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "evq-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Event Resolution
// =============================================================================

#[tokio::test]
async fn test_unknown_event_returns_404_with_no_writes() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/event/ev-nope/questionnaire/submit",
        &payload(json!(true), json!(true)),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!(["Event ev-nope does not exist!"]));

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answers, 0);
}

// =============================================================================
// Classification
// =============================================================================

#[tokio::test]
async fn test_flagged_higher_weight_tier_resolves() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    // Only the class_two question answered true
    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(false), json!(true)),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({ "Questionnaire successfully submitted.": 1 }));

    assert_eq!(event_tier(&pool).await.as_deref(), Some("class_two"));
}

#[tokio::test]
async fn test_all_false_resolves_to_default_tier() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(false), json!(false)),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Default = last tier in ascending weight order
    assert_eq!(event_tier(&pool).await.as_deref(), Some("class_two"));
}

#[tokio::test]
async fn test_lowest_weight_flagged_tier_wins() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(true), json!(true)),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(event_tier(&pool).await.as_deref(), Some("class_one"));
}

// =============================================================================
// Validation Failures
// =============================================================================

#[tokio::test]
async fn test_missing_question_returns_400_with_no_writes() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &json!({ "q_crowd": { (Q_CROWD_LABEL): true } }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!([
            { "Invalid questionnaire submission": "Missing q_sound." },
            { "Invalid questionnaire submission":
                format!("Expected q_sound to have an object keyed with '{}'.", Q_SOUND_LABEL) },
        ])
    );

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answers, 0);
    let submissions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(submissions, 0);
    assert_eq!(event_tier(&pool).await, None);
}

#[tokio::test]
async fn test_non_boolean_answer_returns_400() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!("true"), json!(false)),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!([
            { "Invalid questionnaire submission":
                format!("Expected q_crowd : {} to map to a boolean.", Q_CROWD_LABEL) },
        ])
    );
}

#[tokio::test]
async fn test_non_object_body_returns_400() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool);

    let request = post_json("/event/ev-1/questionnaire/submit", &json!([1, 2]));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!([
            { "Invalid questionnaire submission": "Expected the request body to be a JSON object." },
        ])
    );
}

// =============================================================================
// Persisted Records
// =============================================================================

#[tokio::test]
async fn test_submission_references_exactly_its_answer_records() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(true), json!(false)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let store = SqliteSubmissionStore::new(pool.clone());
    let submissions = store.submissions_for_event("ev-1").await.unwrap();
    assert_eq!(submissions.len(), 1);

    let submission = &submissions[0];
    assert_eq!(submission.name, "qn_ev-1");
    assert_eq!(submission.tier, "class_one");
    assert_eq!(submission.answer_ids.len(), 2);

    // Every referenced answer record exists, in catalog order, with the
    // responses that were submitted
    let mut answers = Vec::new();
    for guid in &submission.answer_ids {
        let answer = store
            .load_answer(guid)
            .await
            .unwrap()
            .expect("referenced answer record exists");
        answers.push((answer.name, answer.response));
    }
    assert_eq!(
        answers,
        vec![
            ("qn_ev-1__q_crowd".to_string(), true),
            ("qn_ev-1__q_sound".to_string(), false),
        ]
    );

    // And they are exactly the records created: one per configured question
    let total_answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total_answers, 2);
}

#[tokio::test]
async fn test_resubmission_creates_a_second_aggregate() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool.clone());

    let first = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(true), json!(false)),
    );
    assert_eq!(app.clone().oneshot(first).await.unwrap().status(), StatusCode::OK);

    let second = post_json(
        "/event/ev-1/questionnaire/submit",
        &payload(json!(false), json!(false)),
    );
    assert_eq!(app.oneshot(second).await.unwrap().status(), StatusCode::OK);

    let store = SqliteSubmissionStore::new(pool.clone());
    let submissions = store.submissions_for_event("ev-1").await.unwrap();
    assert_eq!(submissions.len(), 2);
    assert!(submissions.iter().all(|s| s.answer_ids.len() == 2));

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answers, 4);

    // The event tier reflects the latest submission
    assert_eq!(event_tier(&pool).await.as_deref(), Some("class_two"));
}
