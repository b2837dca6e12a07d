mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use serial_test::serial;
use std::collections::HashSet;
use tower::ServiceExt;

#[tokio::test]
async fn test_question_set_has_unique_questions() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("set-user");

    let questions = common::fetch_questions(&app, &user_id, "prenatal", 5).await;

    assert_eq!(questions.len(), 5);
    let texts: HashSet<&str> = questions
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    assert_eq!(texts.len(), questions.len(), "duplicate question in one set");
}

#[tokio::test]
async fn test_question_shape_matches_contract() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("shape-user");

    let questions = common::fetch_questions(&app, &user_id, "birth", 3).await;

    for question in &questions {
        let object = question.as_object().unwrap();
        assert_eq!(object.len(), 5, "unexpected key in question object");
        for key in [
            "question",
            "options",
            "answer",
            "correctReason",
            "incorrectReason",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }

        let options: Vec<&str> = question["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_str().unwrap())
            .collect();
        assert_eq!(options.len(), 3);
        assert!(options.contains(&question["answer"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_fresh_user_starts_at_difficulty_one() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("fresh-user");

    let (status, body) = common::post_json(
        &app,
        "/api/v1/quiz/preconception/questions",
        json!({ "user_id": user_id, "count": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty_level"], 1);
    assert_eq!(body["stage"], "preconception");
}

#[tokio::test]
async fn test_followup_call_excludes_served_questions() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("dedup-user");

    let first = common::fetch_questions(&app, &user_id, "postnatal", 4).await;
    let second = common::fetch_questions(&app, &user_id, "postnatal", 4).await;

    let first_texts: HashSet<&str> = first
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    let second_texts: HashSet<&str> = second
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 4);
    assert!(
        first_texts.is_disjoint(&second_texts),
        "a question repeated within the session"
    );

    // The whole predefined pool is served now; with the generator off there
    // is nothing left the session allows.
    let third = common::fetch_questions(&app, &user_id, "postnatal", 4).await;
    assert!(third.is_empty());
}

#[tokio::test]
async fn test_unknown_stage_is_rejected() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("stage-user");

    let (status, _) = common::post_json(
        &app,
        "/api/v1/quiz/antenatal/questions",
        json!({ "user_id": user_id, "count": 3 }),
    )
    .await;

    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn test_invalid_count_is_rejected() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("count-user");

    let (status, _) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/questions",
        json!({ "user_id": user_id, "count": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_count_defaults_when_omitted() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("default-user");

    let (status, body) = common::post_json(
        &app,
        "/api/v1/quiz/birth/questions",
        json!({ "user_id": user_id }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
#[serial]
async fn test_generator_outage_degrades_to_predefined_pool() {
    // Point the generator at a closed port and enable it: every fetch fails
    // and selection must still serve the predefined pool without erroring.
    std::env::set_var("GENERATOR_API_URL", "http://127.0.0.1:9");
    let app = common::create_test_app().await;
    std::env::set_var("GENERATOR_ENABLED", "1");

    let user_id = common::unique_user("outage-user");
    let (status, body) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/questions",
        json!({ "user_id": user_id, "count": 4 }),
    )
    .await;

    std::env::set_var("GENERATOR_ENABLED", "0");
    std::env::remove_var("GENERATOR_API_URL");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_health_endpoint_reports_dependencies() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
