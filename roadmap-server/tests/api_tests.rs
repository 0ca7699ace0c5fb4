//! Integration tests for roadmap-server API endpoints
//!
//! Each test runs the full router over a fresh SQLite database in a
//! temporary folder, seeded with the built-in questionnaire.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use roadmap_common::db::{init_database, set_setting};
use roadmap_server::db::questions;
use roadmap_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a seeded temp database
async fn setup_app() -> (Router, SqlitePool, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("roadmap.db"))
        .await
        .expect("Should initialize database");
    questions::seed_if_empty(&pool).await.expect("Should seed questions");

    let app = build_router(AppState::new(pool.clone()));
    (app, pool, dir)
}

/// Test helper: send a request and return status plus parsed JSON body
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, json)
}

/// Test helper: register a user and return the session token
async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn answer(app: &Router, token: &str, question_id: &str, value: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/responses/submit",
        Some(token),
        Some(json!({ "question_id": question_id, "answer_value": value })),
    )
    .await
}

/// Answers pointing firmly at the backend path
async fn answer_backend_profile(app: &Router, token: &str) {
    for (question_id, value) in [
        ("skill_001", "intermediate"),
        ("skill_003", "intermediate"),
        ("interest_001", "web_backend"),
        ("interest_002", "logic_systems"),
        ("style_001", "structured"),
        ("time_001", "intensive"),
    ] {
        let (status, body) = answer(app, token, question_id, value).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }
}

// =============================================================================
// Health and auth
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _pool, _dir) = setup_app().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "roadmap-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_register_and_login() {
    let (app, _pool, _dir) = setup_app().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "login": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["token"].as_str().unwrap().len(), 32);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let (app, _pool, _dir) = setup_app().await;
    register(&app, "bob").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "bob", "email": "other@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "carol", "email": "not-an-email", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "dave", "email": "dave@example.com", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_login_not_shadowed_by_email_shaped_username() {
    let (app, pool, _dir) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "eve@ex.com", "email": "alice@ex.com", "password": "alice-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Same shape as an account stored before such usernames were refused
    sqlx::query(
        "INSERT INTO users (guid, username, email, password_hash, created_at, updated_at) \
         VALUES ('legacy', 'eve@ex.com', 'alice@ex.com', 'unused', 'x', 'x')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "bob", "email": "eve@ex.com", "password": "bob-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "login": "eve@ex.com", "password": "bob-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["user"]["username"], "bob");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _pool, _dir) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/auth/profile", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "erin").await;

    let (status, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "erin");
    assert_eq!(body["progress"]["total_questions"], 9);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let (app, pool, _dir) = setup_app().await;
    set_setting(&pool, "session_timeout_seconds", "0").await.unwrap();
    let token = register(&app, "frank").await;

    let (status, _) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Questionnaire
// =============================================================================

#[tokio::test]
async fn test_questions_public_listing() {
    let (app, _pool, _dir) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/questionnaire/questions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 9);
    assert!(body["user_id"].is_null());
    assert_eq!(body["progress"]["answered_count"], 0);
    for question in body["questions"].as_array().unwrap() {
        assert!(question["user_answer"].is_null());
        assert!(question["options"].as_array().unwrap().len() >= 3);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/questionnaire/questions?category=skill_assessment",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(body["category"], "skill_assessment");
    assert_eq!(body["questions"][0]["question_id"], "skill_001");

    let (status, _) = send(&app, "GET", "/api/questionnaire/questions?category=astrology", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_questions_carry_user_answers_when_authenticated() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "grace").await;
    answer(&app, &token, "time_001", "committed").await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/questionnaire/questions?category=time_planning",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user_id"].is_string());
    assert_eq!(body["progress"]["answered_count"], 1);

    let questions = body["questions"].as_array().unwrap();
    let time_001 = questions.iter().find(|q| q["question_id"] == "time_001").unwrap();
    assert_eq!(time_001["user_answer"]["answer_value"], "committed");
    let time_002 = questions.iter().find(|q| q["question_id"] == "time_002").unwrap();
    assert!(time_002["user_answer"].is_null());
}

#[tokio::test]
async fn test_categories_and_status() {
    let (app, _pool, _dir) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/questionnaire/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_categories"], 5);
    assert_eq!(body["categories"][0]["category"], "skill_assessment");
    assert_eq!(body["categories"][0]["question_count"], 3);

    let token = register(&app, "heidi").await;
    answer(&app, &token, "goal_001", "get_first_job").await;

    let (status, body) = send(&app, "GET", "/api/questionnaire/status", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_progress"]["answered_count"], 1);
    assert_eq!(body["overall_progress"]["progress_percentage"], 11.1);
    assert_eq!(body["category_progress"]["career_goal"]["is_completed"], true);
    assert_eq!(body["category_progress"]["skill_assessment"]["answered_questions"], 0);
}

// =============================================================================
// Responses
// =============================================================================

#[tokio::test]
async fn test_submit_validation() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "ivan").await;

    let (status, _) = answer(&app, &token, "skill_001", "wizard").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = answer(&app, &token, "skill_999", "beginner").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = answer(&app, &token, "", "beginner").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = answer(&app, &token, "skill_001", "beginner").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer_text"], "Beginner (0-1 years)");
    assert_eq!(body["progress"]["answered_count"], 1);
}

#[tokio::test]
async fn test_reanswer_overwrites() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "judy").await;

    answer(&app, &token, "skill_001", "beginner").await;
    answer(&app, &token, "skill_001", "advanced").await;

    let (status, body) = send(&app, "GET", "/api/responses/my-answers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["responses"][0]["answer_value"], "advanced");
    assert_eq!(body["responses"][0]["payload"]["category"], "skill_assessment");
}

#[tokio::test]
async fn test_batch_counts_failures() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "mallory").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/responses/batch",
        Some(&token),
        Some(json!({
            "answers": [
                { "question_id": "skill_001", "answer_value": "advanced" },
                { "question_id": "interest_001", "answer_value": "data_ai" },
                { "question_id": "interest_002", "answer_value": "nope" },
                { "question_id": "missing_001", "answer_value": "x" },
                { "answer_value": "orphan" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success_count"], 2);
    assert_eq!(body["failed_count"], 3);
    assert_eq!(body["total_count"], 5);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    assert_eq!(body["progress"]["answered_count"], 2);

    let (status, _) = send(
        &app,
        "POST",
        "/api/responses/batch",
        Some(&token),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_and_recommendation_data() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "niaj").await;
    answer_backend_profile(&app, &token).await;

    let (status, body) = send(&app, "GET", "/api/responses/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_responses"], 6);
    assert_eq!(body["profile_data"]["skill_assessment"].as_array().unwrap().len(), 2);
    assert_eq!(body["profile_data"]["career_goal"].as_array().unwrap().len(), 0);
    let completed = body["completed_categories"].as_array().unwrap();
    assert_eq!(completed.len(), 4);
    assert!(!completed.contains(&json!("career_goal")));

    let (status, body) = send(
        &app,
        "GET",
        "/api/responses/recommendation-data",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response_count"], 6);
    // all_paths 0.5 * 0.5 plus backend 0.6
    let backend_level = body["skill_assessment"]["backend"]["level"].as_f64().unwrap();
    assert!((backend_level - 0.85).abs() < 1e-9);
    assert_eq!(body["time_planning"]["plans"][0]["hours_per_week"], 30.0);
}

#[tokio::test]
async fn test_reset_answers() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "olivia").await;

    let (status, _) = send(&app, "DELETE", "/api/responses/reset", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    answer(&app, &token, "skill_001", "beginner").await;
    let (status, body) = send(&app, "DELETE", "/api/responses/reset", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 1);

    let (_, body) = send(&app, "GET", "/api/responses/my-answers", Some(&token), None).await;
    assert_eq!(body["count"], 0);
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_generate_requires_minimum_answers() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "peggy").await;
    answer(&app, &token, "skill_001", "beginner").await;

    let (status, body) = send(&app, "POST", "/api/recommendations/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_generate_and_fetch_recommendation() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "rupert").await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/recommendations/my-recommendation",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    answer_backend_profile(&app, &token).await;

    let (status, body) = send(&app, "POST", "/api/recommendations/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["primary_path"]["path_name"], "backend");
    assert!(body.get("is_default").is_none());
    // 30 hours per week: 26 * 0.8
    assert_eq!(body["learning_plan"]["total_duration_weeks"], 21);
    let confidence = body["confidence_score"].as_f64().unwrap();
    assert!(confidence > 0.0 && confidence <= 1.0);

    let (status, stored) = send(
        &app,
        "GET",
        "/api/recommendations/my-recommendation",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["expired"], false);
    assert_eq!(stored["primary_path"]["path_name"], "backend");
    assert_eq!(stored["generated_at"], body["generated_at"]);
}

#[tokio::test]
async fn test_expired_recommendation_flagged() {
    let (app, pool, _dir) = setup_app().await;
    let token = register(&app, "sybil").await;
    answer_backend_profile(&app, &token).await;
    send(&app, "POST", "/api/recommendations/generate", Some(&token), None).await;

    set_setting(&pool, "recommendation_expiry_days", "-1").await.unwrap();

    let (status, body) = send(
        &app,
        "GET",
        "/api/recommendations/my-recommendation",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expired"], true);
}

#[tokio::test]
async fn test_regenerate_overwrites() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "trent").await;

    for (question_id, value) in [
        ("skill_001", "beginner"),
        ("interest_001", "web_backend"),
        ("time_001", "part_time"),
    ] {
        answer(&app, &token, question_id, value).await;
    }

    // Three answers clear the regenerate bar but not the generate bar
    let (status, _) = send(&app, "POST", "/api/recommendations/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, first) = send(&app, "POST", "/api/recommendations/regenerate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["primary_path"]["path_name"], "backend");

    answer(&app, &token, "interest_001", "mobile_dev").await;
    answer(&app, &token, "interest_002", "user_interaction").await;

    let (status, second) = send(&app, "POST", "/api/recommendations/regenerate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["primary_path"]["path_name"], "mobile");

    let (_, stored) = send(
        &app,
        "GET",
        "/api/recommendations/my-recommendation",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(stored["primary_path"]["path_name"], "mobile");
}

#[tokio::test]
async fn test_learning_paths_and_details() {
    let (app, _pool, _dir) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/recommendations/learning-paths", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_paths"], 4);
    assert_eq!(body["paths"][0]["path_name"], "frontend");
    assert_eq!(body["paths"][0]["stages_count"], 3);

    let (status, body) = send(
        &app,
        "GET",
        "/api/recommendations/path-details/data_science",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path_name"], "data_science");
    assert_eq!(body["duration_weeks"], 30);

    let (status, body) = send(
        &app,
        "GET",
        "/api/recommendations/path-details/blockchain",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_feedback_rating_validation() {
    let (app, _pool, _dir) = setup_app().await;
    let token = register(&app, "victor").await;

    for rating in [json!(0), json!(6), json!(4.5), json!("5")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/recommendations/feedback",
            Some(&token),
            Some(json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {}", rating);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/recommendations/feedback",
        Some(&token),
        Some(json!({ "rating": 4, "feedback": "useful", "suggestions": ["more videos"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["feedback_saved"], true);
}
